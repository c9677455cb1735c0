// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat transport for deterministic testing.
//!
//! `MockTransport` implements `ChatTransport` with injectable inbound events
//! and captured outbound traffic for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use roundup_core::traits::adapter::Adapter;
use roundup_core::traits::transport::ChatTransport;
use roundup_core::types::{
    AdapterType, ConversationId, DeleteOutcome, HealthStatus, InboundEvent, Keyboard, MessageId,
};
use roundup_core::RoundupError;

/// A message captured by [`MockTransport::send`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub id: MessageId,
    pub conversation: ConversationId,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

/// A document captured by [`MockTransport::send_document`].
#[derive(Debug, Clone)]
pub struct SentDocument {
    pub conversation: ConversationId,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub caption: String,
}

/// A mock messaging transport for testing.
///
/// Provides an inbound queue fed by `inject_event()` and capture logs for
/// everything sent, edited, or deleted, so tests can assert on the exact
/// transcript the engine produced.
pub struct MockTransport {
    events: Arc<Mutex<VecDeque<InboundEvent>>>,
    notify: Arc<Notify>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    deleted: Arc<Mutex<Vec<MessageId>>>,
    documents: Arc<Mutex<Vec<SentDocument>>>,
    counter: AtomicU64,
    fail_sends: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
            sent: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            documents: Arc::new(Mutex::new(Vec::new())),
            counter: AtomicU64::new(0),
            fail_sends: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Inject an inbound event; the next `next_event()` call returns it.
    pub async fn inject_event(&self, event: InboundEvent) {
        self.events.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// All messages sent so far, in order.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// All deleted message ids, in order.
    pub async fn deleted_ids(&self) -> Vec<MessageId> {
        self.deleted.lock().await.clone()
    }

    /// All documents uploaded so far.
    pub async fn documents(&self) -> Vec<SentDocument> {
        self.documents.lock().await.clone()
    }

    /// Messages sent to `conversation` that have not been deleted, in order.
    ///
    /// The single-live-prompt invariant is asserted against this.
    pub async fn live_messages(&self, conversation: &ConversationId) -> Vec<SentMessage> {
        let deleted = self.deleted.lock().await.clone();
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.conversation == *conversation && !deleted.contains(&m.id))
            .cloned()
            .collect()
    }

    /// Make every subsequent `send` fail until reset.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `delete` fail until reset.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RoundupError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RoundupError> {
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(
        &self,
        conversation: &ConversationId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageId, RoundupError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(RoundupError::channel("mock send failure"));
        }
        let id = MessageId(format!("m{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1));
        self.sent.lock().await.push(SentMessage {
            id: id.clone(),
            conversation: conversation.clone(),
            text: text.to_string(),
            keyboard,
        });
        Ok(id)
    }

    async fn edit(
        &self,
        _conversation: &ConversationId,
        message: &MessageId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), RoundupError> {
        let mut sent = self.sent.lock().await;
        let Some(existing) = sent.iter_mut().find(|m| m.id == *message) else {
            return Err(RoundupError::channel(format!(
                "cannot edit unknown message {message}"
            )));
        };
        existing.text = text.to_string();
        existing.keyboard = keyboard;
        Ok(())
    }

    async fn delete(
        &self,
        _conversation: &ConversationId,
        message: &MessageId,
    ) -> Result<DeleteOutcome, RoundupError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(RoundupError::channel("mock delete failure"));
        }
        let known = self.sent.lock().await.iter().any(|m| m.id == *message);
        let mut deleted = self.deleted.lock().await;
        if !known || deleted.contains(message) {
            return Ok(DeleteOutcome::NotFound);
        }
        deleted.push(message.clone());
        Ok(DeleteOutcome::Deleted)
    }

    async fn send_document(
        &self,
        conversation: &ConversationId,
        filename: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> Result<(), RoundupError> {
        self.documents.lock().await.push(SentDocument {
            conversation: conversation.clone(),
            filename: filename.to_string(),
            bytes,
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn next_event(&self) -> Result<InboundEvent, RoundupError> {
        loop {
            {
                let mut queue = self.events.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundup_core::types::{EventKind, Participant, ParticipantId};

    fn make_event(text: &str) -> InboundEvent {
        InboundEvent {
            participant: Participant {
                id: ParticipantId("1".into()),
                display_name: "Test".into(),
                handle: None,
            },
            conversation: ConversationId("1".into()),
            kind: EventKind::Text(text.into()),
        }
    }

    #[tokio::test]
    async fn next_event_returns_injected_events_in_order() {
        let transport = MockTransport::new();
        transport.inject_event(make_event("first")).await;
        transport.inject_event(make_event("second")).await;

        let e1 = transport.next_event().await.unwrap();
        let e2 = transport.next_event().await.unwrap();
        match (&e1.kind, &e2.kind) {
            (EventKind::Text(a), EventKind::Text(b)) => {
                assert_eq!(a, "first");
                assert_eq!(b, "second");
            }
            _ => panic!("expected text events"),
        }
    }

    #[tokio::test]
    async fn send_captures_and_numbers_messages() {
        let transport = MockTransport::new();
        let conv = ConversationId("1".into());
        let id = transport.send(&conv, "hello", None).await.unwrap();
        assert_eq!(id, MessageId("m1".into()));
        assert_eq!(transport.sent_messages().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let transport = MockTransport::new();
        let conv = ConversationId("1".into());
        let id = transport.send(&conv, "hello", None).await.unwrap();
        assert_eq!(
            transport.delete(&conv, &id).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            transport.delete(&conv, &id).await.unwrap(),
            DeleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn live_messages_excludes_deleted() {
        let transport = MockTransport::new();
        let conv = ConversationId("1".into());
        let first = transport.send(&conv, "one", None).await.unwrap();
        transport.send(&conv, "two", None).await.unwrap();
        transport.delete(&conv, &first).await.unwrap();

        let live = transport.live_messages(&conv).await;
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].text, "two");
    }

    #[tokio::test]
    async fn failing_deletes_error_without_recording() {
        let transport = MockTransport::new();
        let conv = ConversationId("1".into());
        let id = transport.send(&conv, "one", None).await.unwrap();
        transport.set_fail_deletes(true);
        assert!(transport.delete(&conv, &id).await.is_err());
        assert!(transport.deleted_ids().await.is_empty());
    }
}
