// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the adapter traits and the survey engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::action::ActionTag;

/// Unique identifier for a survey participant (the platform user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a conversation (chat) on the transport.
///
/// On Telegram a direct-message conversation id equals the participant's
/// user id, but the core never relies on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a table in the tabular store (a spreadsheet id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId(pub String);

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Profile of the participant behind an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    /// Display name as reported by the transport.
    pub display_name: String,
    /// Platform handle (Telegram username), if the participant has one.
    pub handle: Option<String>,
}

impl Participant {
    /// The handle as stored in submission rows: the real handle, or the
    /// `"N/A"` placeholder when the participant has none.
    pub fn handle_or_placeholder(&self) -> &str {
        self.handle.as_deref().unwrap_or("N/A")
    }
}

/// One inbound action from the transport, already attributed to a participant.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub participant: Participant,
    pub conversation: ConversationId,
    pub kind: EventKind,
}

/// The payload of an inbound event.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// A plain text message (answers and slash commands both arrive here).
    Text(String),
    /// A button press carrying a decoded [`ActionTag`].
    Action(ActionTag),
}

/// A single inline button: a label and the action it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ActionTag,
}

impl Button {
    pub fn new(label: impl Into<String>, action: ActionTag) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Inline keyboard attached to an outbound message, as rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// A keyboard with a single button on a single row.
    pub fn single(button: Button) -> Self {
        Self {
            rows: vec![vec![button]],
        }
    }
}

/// Result of a message deletion attempt.
///
/// `NotFound` is not a failure: the message may have been deleted by the
/// user or expired on the platform side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Access role granted on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRole {
    Writer,
    Reader,
}

impl AccessRole {
    /// Wire representation used by the storage backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRole::Writer => "writer",
            AccessRole::Reader => "reader",
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind the trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Channel,
    Store,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_placeholder_when_absent() {
        let p = Participant {
            id: ParticipantId("42".into()),
            display_name: "Test User".into(),
            handle: None,
        };
        assert_eq!(p.handle_or_placeholder(), "N/A");
    }

    #[test]
    fn handle_used_when_present() {
        let p = Participant {
            id: ParticipantId("42".into()),
            display_name: "Test User".into(),
            handle: Some("testuser".into()),
        };
        assert_eq!(p.handle_or_placeholder(), "testuser");
    }

    #[test]
    fn access_role_wire_names() {
        assert_eq!(AccessRole::Writer.as_str(), "writer");
        assert_eq!(AccessRole::Reader.as_str(), "reader");
    }

    #[test]
    fn adapter_type_display() {
        assert_eq!(AdapterType::Channel.to_string(), "Channel");
        assert_eq!(AdapterType::Store.to_string(), "Store");
    }
}
