// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete survey stack with mock adapters and
//! provides helpers to drive the full pipeline (event in -> engine ->
//! transcript + sheet out) in tests.

use std::sync::Arc;

use roundup_config::RoundupConfig;
use roundup_core::types::{
    ConversationId, EventKind, InboundEvent, Participant, ParticipantId,
};
use roundup_core::{ActionTag, RoundupError};
use roundup_engine::SurveyService;

use crate::mock_store::MockStore;
use crate::mock_transport::MockTransport;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    questions: Vec<String>,
    rotation_days: u64,
    main_admin: String,
    admins: Vec<String>,
    owner_email: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            questions: vec!["1) First question".into(), "2) Second question".into()],
            rotation_days: 7,
            main_admin: "900".into(),
            admins: Vec::new(),
            owner_email: Some("owner@example.com".into()),
        }
    }

    /// Set the question catalog.
    pub fn with_questions(mut self, questions: Vec<&str>) -> Self {
        self.questions = questions.into_iter().map(String::from).collect();
        self
    }

    /// Set the rotation window in days. `0` makes every week immediately
    /// stale, which is how tests exercise lazy rotation without clock
    /// control.
    pub fn with_rotation_days(mut self, days: u64) -> Self {
        self.rotation_days = days;
        self
    }

    /// Set the main admin id.
    pub fn with_main_admin(mut self, id: &str) -> Self {
        self.main_admin = id.to_string();
        self
    }

    /// Set the initial sub-admin ids.
    pub fn with_admins(mut self, ids: Vec<&str>) -> Self {
        self.admins = ids.into_iter().map(String::from).collect();
        self
    }

    /// Build the test harness.
    pub fn build(self) -> Result<TestHarness, RoundupError> {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MockStore::new());

        let mut config = RoundupConfig::default();
        config.survey.questions = self.questions;
        config.survey.rotation_days = self.rotation_days;
        config.admin.main_admin = Some(self.main_admin);
        config.admin.admins = self.admins;
        config.sheets.owner_email = self.owner_email;

        let service = Arc::new(SurveyService::new(
            transport.clone(),
            store.clone(),
            &config,
        )?);

        Ok(TestHarness {
            transport,
            store,
            service,
        })
    }
}

/// A complete test environment with mock adapters.
pub struct TestHarness {
    /// The mock chat transport.
    pub transport: Arc<MockTransport>,
    /// The mock tabular store.
    pub store: Arc<MockStore>,
    /// The survey service under test.
    pub service: Arc<SurveyService>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A participant profile whose DM conversation id equals their user id,
    /// matching the platform's behavior.
    pub fn participant(id: &str, name: &str, handle: Option<&str>) -> Participant {
        Participant {
            id: ParticipantId(id.to_string()),
            display_name: name.to_string(),
            handle: handle.map(String::from),
        }
    }

    fn conversation(participant: &Participant) -> ConversationId {
        ConversationId(participant.id.0.clone())
    }

    /// Drive a text message from the participant through the engine.
    pub async fn send_text(
        &self,
        participant: &Participant,
        text: &str,
    ) -> Result<(), RoundupError> {
        self.service
            .handle_event(InboundEvent {
                participant: participant.clone(),
                conversation: Self::conversation(participant),
                kind: EventKind::Text(text.to_string()),
            })
            .await
    }

    /// Drive a button press from the participant through the engine.
    pub async fn press(
        &self,
        participant: &Participant,
        tag: ActionTag,
    ) -> Result<(), RoundupError> {
        self.service
            .handle_event(InboundEvent {
                participant: participant.clone(),
                conversation: Self::conversation(participant),
                kind: EventKind::Action(tag),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().unwrap();
        assert_eq!(harness.store.table_count().await, 0);
        assert!(harness.transport.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn full_flow_appends_one_row() {
        let harness = TestHarness::builder().build().unwrap();
        let ada = TestHarness::participant("7", "Ada Lovelace", Some("ada"));

        harness.press(&ada, ActionTag::StartForm).await.unwrap();
        harness.send_text(&ada, "wrote an engine").await.unwrap();
        harness.send_text(&ada, "notes on the analytical engine").await.unwrap();

        let tables = harness.store.table_ids().await;
        assert_eq!(tables.len(), 1);
        let rows = harness.store.rows_of(&tables[0]).await;
        assert_eq!(rows.len(), 2); // header + one submission
        assert_eq!(rows[1][0], "7");
        assert_eq!(rows[1][1], "Ada Lovelace");
        assert_eq!(rows[1][2], "ada");
        assert_eq!(&rows[1][4..], &["wrote an engine", "notes on the analytical engine"]);
    }
}
