// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat transport trait for the messaging platform integration.

use async_trait::async_trait;

use crate::error::RoundupError;
use crate::traits::adapter::Adapter;
use crate::types::{ConversationId, DeleteOutcome, InboundEvent, Keyboard, MessageId};

/// Bidirectional seam to the messaging platform.
///
/// The engine drives all outbound chat through this trait and consumes the
/// platform's inbound stream via [`next_event`](ChatTransport::next_event).
/// Every method is external I/O; callers must order their own state
/// mutations so that a failure here leaves the engine consistent.
#[async_trait]
pub trait ChatTransport: Adapter {
    /// Sends a message, optionally with an inline keyboard, and returns the
    /// platform message id.
    async fn send(
        &self,
        conversation: &ConversationId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageId, RoundupError>;

    /// Edits an existing message in place.
    async fn edit(
        &self,
        conversation: &ConversationId,
        message: &MessageId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), RoundupError>;

    /// Deletes a message. A message that is already gone is reported as
    /// [`DeleteOutcome::NotFound`], not as an error.
    async fn delete(
        &self,
        conversation: &ConversationId,
        message: &MessageId,
    ) -> Result<DeleteOutcome, RoundupError>;

    /// Uploads a file into the conversation with a caption.
    async fn send_document(
        &self,
        conversation: &ConversationId,
        filename: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> Result<(), RoundupError>;

    /// Waits for and returns the next inbound event from the platform.
    async fn next_event(&self) -> Result<InboundEvent, RoundupError>;
}
