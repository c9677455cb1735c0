// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message routing, authorization filtering, and event extraction.
//!
//! Determines whether an incoming Telegram update should be processed based
//! on chat type and the allowlist, then extracts it into a channel-agnostic
//! [`InboundEvent`].

use roundup_core::ActionTag;
use roundup_core::types::{ConversationId, EventKind, InboundEvent, Participant, ParticipantId};
use teloxide::prelude::*;
use teloxide::types::{ChatKind, User};

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`: the survey is a
/// one-on-one flow.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Checks whether the message sender passes the allowlist.
///
/// Messages without a sender (channel posts) always return `false`.
pub fn is_allowed(msg: &Message, allowed_users: &[String]) -> bool {
    match msg.from.as_ref() {
        Some(user) => is_user_allowed(user, allowed_users),
        None => false,
    }
}

/// Checks a user against the allowlist by id or username.
///
/// An empty allowlist admits everyone: the survey is open to all
/// participants by default, and privileged commands are gated by the admin
/// roster independently of this filter.
pub fn is_user_allowed(user: &User, allowed_users: &[String]) -> bool {
    if allowed_users.is_empty() {
        return true;
    }

    let user_id_str = user.id.0.to_string();

    for allowed in allowed_users {
        // Match by user ID
        if *allowed == user_id_str {
            return true;
        }
        // Match by username (with or without @ prefix)
        if let Some(ref username) = user.username {
            let allowed_clean = allowed.strip_prefix('@').unwrap_or(allowed);
            if username.eq_ignore_ascii_case(allowed_clean) {
                return true;
            }
        }
    }

    false
}

/// Builds a participant profile from a Telegram user.
pub fn profile(user: &User) -> Participant {
    Participant {
        id: ParticipantId(user.id.0.to_string()),
        display_name: user.full_name(),
        handle: user.username.clone(),
    }
}

/// Converts a text message into an [`InboundEvent`].
///
/// Returns `None` for non-text messages (stickers, photos, voice notes):
/// the survey collects written answers only.
pub fn message_to_event(msg: &Message) -> Option<InboundEvent> {
    let user = msg.from.as_ref()?;
    let text = msg.text()?;

    Some(InboundEvent {
        participant: profile(user),
        conversation: ConversationId(msg.chat.id.0.to_string()),
        kind: EventKind::Text(text.to_string()),
    })
}

/// Converts a callback query (button press) into an [`InboundEvent`].
///
/// Returns `None` when the callback data does not decode to a known action
/// tag; stale or tampered data is dropped here.
pub fn callback_to_event(query: &CallbackQuery) -> Option<InboundEvent> {
    let data = query.data.as_deref()?;
    let tag = ActionTag::decode(data)?;

    let conversation = query
        .message
        .as_ref()
        .map(|m| m.chat().id.0.to_string())
        .unwrap_or_else(|| query.from.id.0.to_string());

    Some(InboundEvent {
        participant: profile(&query.from),
        conversation: ConversationId(conversation),
        kind: EventKind::Action(tag),
    })
}
