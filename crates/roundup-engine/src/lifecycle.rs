// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt replacement: at most one live prompt message per participant.
//!
//! Every time a new prompt or status message is shown, the previously
//! recorded one is deleted first. Deletion is best-effort; the message may
//! already be gone, and a failed delete never blocks the new prompt.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use roundup_core::types::{ConversationId, Keyboard, MessageId, ParticipantId};
use roundup_core::{ChatTransport, RoundupError};
use tracing::warn;

struct Cursor {
    conversation: ConversationId,
    message: MessageId,
}

/// Tracks the single current outbound prompt per participant.
pub struct MessageLifecycle {
    transport: Arc<dyn ChatTransport>,
    cursors: Mutex<HashMap<ParticipantId, Cursor>>,
}

impl MessageLifecycle {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            cursors: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the participant's current prompt with a new one.
    ///
    /// The previous cursor is taken out of the map before any I/O, so even
    /// if the send fails the old prompt is no longer tracked and cannot be
    /// double-deleted later.
    pub async fn show(
        &self,
        participant: &ParticipantId,
        conversation: &ConversationId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageId, RoundupError> {
        let previous = {
            let mut cursors = self.cursors.lock().expect("cursor map poisoned");
            cursors.remove(participant)
        };

        if let Some(prev) = previous
            && let Err(e) = self.transport.delete(&prev.conversation, &prev.message).await
        {
            warn!(
                participant = %participant,
                message = %prev.message,
                error = %e,
                "failed to retire previous prompt"
            );
        }

        let message = self.transport.send(conversation, text, keyboard).await?;

        let mut cursors = self.cursors.lock().expect("cursor map poisoned");
        cursors.insert(
            participant.clone(),
            Cursor {
                conversation: conversation.clone(),
                message: message.clone(),
            },
        );

        Ok(message)
    }

    /// Forgets the participant's current prompt without deleting it.
    pub fn clear(&self, participant: &ParticipantId) {
        let mut cursors = self.cursors.lock().expect("cursor map poisoned");
        cursors.remove(participant);
    }

    /// The currently tracked prompt message, if any.
    pub fn tracked(&self, participant: &ParticipantId) -> Option<MessageId> {
        let cursors = self.cursors.lock().expect("cursor map poisoned");
        cursors.get(participant).map(|c| c.message.clone())
    }
}
