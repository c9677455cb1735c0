// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Survey engine for the roundup bot.
//!
//! The [`SurveyService`] is the central coordinator that:
//! - Receives inbound events from the chat transport
//! - Drives each participant's session through the question catalog
//! - Keeps the transcript clean (one live prompt per participant)
//! - Commits completed submissions to the week's sheet, rotating stale weeks
//! - Serves the operator command surface (export, broadcast, roster, catalog)
//! - Handles graceful shutdown
//!
//! Concurrency model: events for different participants are handled
//! concurrently; events for the same participant serialize on a
//! per-participant entry lock held for the whole interaction, so no two
//! answers for one participant can interleave. The week registry has its own
//! lock held across rotation so concurrent commits cannot double-rotate.

pub mod admin;
pub mod catalog;
pub mod commands;
pub mod lifecycle;
pub mod session;
pub mod weeks;

use std::sync::{Arc, RwLock};

use chrono::Utc;
use dashmap::DashMap;
use roundup_config::RoundupConfig;
use roundup_core::types::{
    Button, ConversationId, EventKind, InboundEvent, Keyboard, Participant, ParticipantId,
};
use roundup_core::{ActionTag, ChatTransport, RoundupError, TableStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::admin::AdminRoster;
use crate::catalog::Catalog;
use crate::commands::{CatalogAction, Command, Parsed};
use crate::lifecycle::MessageLifecycle;
use crate::session::{AnswerOutcome, NavOutcome, SessionEngine};
use crate::weeks::{TIMESTAMP_FORMAT, Week, WeekRegistry};

const START_TEXT: &str = "Hi!\n\nRegister your weekly activity overview by clicking the button \
below.\n\nCarefully read each question before you answer to make the process easier for everyone.";
const START_BUTTON_LABEL: &str = "Gathering Weekly Updates";
const NOT_STARTED_TEXT: &str = "Please start the form by clicking the button.";
const RECORDED_TEXT: &str = "Your responses have been recorded!";
const SAVE_FAILED_TEXT: &str = "An error occurred while saving your responses. \
Please send your last answer again to retry.";
const UNAUTHORIZED_TEXT: &str = "You are not authorized to perform this action.";
const MAIN_ADMIN_ONLY_TEXT: &str = "Only the main admin can do that.";
const HELP_TEXT: &str = "Commands:\n\
/start - show the start menu\n\
/newweek - start a new week (admins)\n\
/exportcsv - export this week's responses as CSV (admins)\n\
/listweeks - list all weeks and their sheets (admins)\n\
/answers <user id> - show a participant's latest submission (admins)\n\
/broadcast <message> - message every known participant (admins)\n\
/admins - list the admin roster (admins)\n\
/addadmin <user id> - add a sub-admin (main admin)\n\
/removeadmin <user id> - remove a sub-admin (main admin)\n\
/questions - list questions (admins); add/remove (main admin)\n\
/help - this message";

/// The survey service: owns all mutable state and the adapter seams.
pub struct SurveyService {
    transport: Arc<dyn ChatTransport>,
    store: Arc<dyn TableStore>,
    catalog: RwLock<Catalog>,
    sessions: SessionEngine,
    lifecycle: MessageLifecycle,
    weeks: WeekRegistry,
    roster: AdminRoster,
    entry_locks: DashMap<ParticipantId, Arc<tokio::sync::Mutex<()>>>,
    owner_email: Option<String>,
}

impl SurveyService {
    /// Builds the service from configuration.
    ///
    /// Requires `admin.main_admin`; the catalog must be non-empty.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        store: Arc<dyn TableStore>,
        config: &RoundupConfig,
    ) -> Result<Self, RoundupError> {
        let main = config
            .admin
            .main_admin
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| RoundupError::Config("admin.main_admin is required".to_string()))?;

        let catalog = Catalog::new(config.survey.questions.clone())?;
        let roster = AdminRoster::new(
            ParticipantId(main.to_string()),
            config
                .admin
                .admins
                .iter()
                .map(|s| ParticipantId(s.clone()))
                .collect(),
        );

        Ok(Self {
            lifecycle: MessageLifecycle::new(transport.clone()),
            transport,
            store,
            catalog: RwLock::new(catalog),
            sessions: SessionEngine::new(),
            weeks: WeekRegistry::new(config.survey.rotation_days),
            roster,
            entry_locks: DashMap::new(),
            owner_email: config.sheets.owner_email.clone(),
        })
    }

    /// Runs the main event loop until the cancellation token is triggered.
    ///
    /// Each inbound event is handled on its own task so one participant's
    /// slow I/O never blocks another's; the per-participant entry lock
    /// provides the required serialization within a participant.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) -> Result<(), RoundupError> {
        info!("survey loop running");

        loop {
            tokio::select! {
                event = self.transport.next_event() => {
                    match event {
                        Ok(event) => {
                            let service = Arc::clone(&self);
                            tokio::spawn(async move {
                                if let Err(e) = service.handle_event(event).await {
                                    error!(error = %e, "failed to handle inbound event");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "transport receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping survey loop");
                    break;
                }
            }
        }

        self.transport.shutdown().await?;
        self.store.shutdown().await?;

        info!("survey loop stopped");
        Ok(())
    }

    /// Handles a single inbound event.
    ///
    /// Public so tests can drive the service without a transport loop.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<(), RoundupError> {
        match event.kind.clone() {
            EventKind::Text(text) => {
                if text.trim_start().starts_with('/') {
                    self.handle_command(&event, &text).await
                } else {
                    let lock = self.entry_lock(&event.participant.id);
                    let _guard = lock.lock().await;
                    self.handle_answer(&event.participant, &event.conversation, &text)
                        .await
                }
            }
            EventKind::Action(tag) => self.handle_action(&event, tag).await,
        }
    }

    /// Access to the session engine (used by the admin surface and tests).
    pub fn sessions(&self) -> &SessionEngine {
        &self.sessions
    }

    /// Access to the message lifecycle tracker (used by tests).
    pub fn lifecycle(&self) -> &MessageLifecycle {
        &self.lifecycle
    }

    /// Access to the week registry (used by tests).
    pub fn weeks(&self) -> &WeekRegistry {
        &self.weeks
    }

    /// Access to the admin roster.
    pub fn roster(&self) -> &AdminRoster {
        &self.roster
    }

    fn entry_lock(&self, participant: &ParticipantId) -> Arc<tokio::sync::Mutex<()>> {
        self.entry_locks
            .entry(participant.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn question_count(&self) -> usize {
        self.catalog.read().expect("catalog poisoned").len()
    }

    fn share_with(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(identity) = self.store.identity() {
            out.push(identity);
        }
        if let Some(ref owner) = self.owner_email {
            out.push(owner.clone());
        }
        out
    }

    async fn send_text(
        &self,
        conversation: &ConversationId,
        text: &str,
    ) -> Result<(), RoundupError> {
        self.transport.send(conversation, text, None).await?;
        Ok(())
    }

    // --- Survey flow ---

    async fn handle_answer(
        &self,
        participant: &Participant,
        conversation: &ConversationId,
        text: &str,
    ) -> Result<(), RoundupError> {
        let count = self.question_count();
        match self.sessions.record_answer(&participant.id, text, count) {
            AnswerOutcome::NotStarted => {
                self.lifecycle
                    .show(
                        &participant.id,
                        conversation,
                        NOT_STARTED_TEXT,
                        Some(start_keyboard()),
                    )
                    .await?;
                Ok(())
            }
            AnswerOutcome::Next(index) => self.show_question(participant, conversation, index).await,
            AnswerOutcome::Complete(answers) => {
                self.finish_submission(participant, conversation, answers)
                    .await
            }
        }
    }

    async fn handle_action(
        &self,
        event: &InboundEvent,
        tag: ActionTag,
    ) -> Result<(), RoundupError> {
        let participant = &event.participant;
        let conversation = &event.conversation;

        match tag {
            ActionTag::StartForm => {
                let lock = self.entry_lock(&participant.id);
                let _guard = lock.lock().await;
                let index = self.sessions.begin(&participant.id);
                self.show_question(participant, conversation, index).await
            }
            ActionTag::BackToStart => {
                let lock = self.entry_lock(&participant.id);
                let _guard = lock.lock().await;
                self.sessions.cancel(&participant.id);
                self.lifecycle
                    .show(&participant.id, conversation, START_TEXT, Some(start_keyboard()))
                    .await?;
                Ok(())
            }
            ActionTag::BackToQuestion(target) => {
                let lock = self.entry_lock(&participant.id);
                let _guard = lock.lock().await;
                let count = self.question_count();
                match self.sessions.navigate_back(&participant.id, target, count) {
                    Ok(NavOutcome::Moved) => {
                        self.show_question(participant, conversation, target).await
                    }
                    Ok(NavOutcome::NotStarted) => {
                        self.lifecycle
                            .show(
                                &participant.id,
                                conversation,
                                NOT_STARTED_TEXT,
                                Some(start_keyboard()),
                            )
                            .await?;
                        Ok(())
                    }
                    Err(e) => {
                        // Stale or tampered callback data; dropping the
                        // press leaves the current prompt in place.
                        warn!(
                            participant = %participant.id,
                            error = %e,
                            "ignoring invalid navigation"
                        );
                        Ok(())
                    }
                }
            }
            ActionTag::SeeAnswers(target) => {
                if !self.roster.is_admin(&participant.id) {
                    return self.send_text(conversation, UNAUTHORIZED_TEXT).await;
                }
                self.send_latest(conversation, &target).await
            }
        }
    }

    async fn show_question(
        &self,
        participant: &Participant,
        conversation: &ConversationId,
        index: usize,
    ) -> Result<(), RoundupError> {
        let prompt = {
            let catalog = self.catalog.read().expect("catalog poisoned");
            catalog.prompt(index).map(str::to_string)
        };
        let Some(prompt) = prompt else {
            // The catalog shrank under this session; restart cleanly.
            warn!(
                participant = %participant.id,
                index,
                "question index no longer in catalog, resetting session"
            );
            self.sessions.cancel(&participant.id);
            self.lifecycle
                .show(&participant.id, conversation, START_TEXT, Some(start_keyboard()))
                .await?;
            return Ok(());
        };

        self.lifecycle
            .show(
                &participant.id,
                conversation,
                &prompt,
                Some(question_keyboard(index)),
            )
            .await?;
        Ok(())
    }

    async fn finish_submission(
        &self,
        participant: &Participant,
        conversation: &ConversationId,
        answers: Vec<String>,
    ) -> Result<(), RoundupError> {
        match self.commit_submission(participant, &answers).await {
            Ok(week) => {
                // The session is dropped only now that the row is in the
                // sheet; a crash before this point costs nothing persisted.
                self.sessions.finalize(&participant.id);
                self.lifecycle
                    .show(
                        &participant.id,
                        conversation,
                        RECORDED_TEXT,
                        Some(Keyboard::single(Button::new(
                            "Back to main menu",
                            ActionTag::BackToStart,
                        ))),
                    )
                    .await?;
                self.notify_admins(participant, &week).await;
                Ok(())
            }
            Err(e) => {
                warn!(
                    participant = %participant.id,
                    error = %e,
                    "submission commit failed, session retained for retry"
                );
                self.lifecycle
                    .show(&participant.id, conversation, SAVE_FAILED_TEXT, None)
                    .await?;
                Ok(())
            }
        }
    }

    /// Commits a finalized submission: ensures the active week is fresh
    /// (rotating if stale), then appends the row.
    async fn commit_submission(
        &self,
        participant: &Participant,
        answers: &[String],
    ) -> Result<Week, RoundupError> {
        let header = {
            let catalog = self.catalog.read().expect("catalog poisoned");
            catalog.header_row()
        };
        let share = self.share_with();
        let week = self
            .weeks
            .ensure_fresh(self.store.as_ref(), &header, &share)
            .await?;

        let mut row = vec![
            participant.id.to_string(),
            participant.display_name.clone(),
            participant.handle_or_placeholder().to_string(),
            Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        ];
        row.extend(answers.iter().cloned());

        self.store.append_row(&week.table, &row).await?;

        info!(
            participant = %participant.id,
            week = week.number,
            "submission recorded"
        );
        Ok(week)
    }

    /// Notifies every admin of a new submission. Per-admin delivery
    /// failures are logged and never abort the fan-out.
    async fn notify_admins(&self, participant: &Participant, week: &Week) {
        let summary = format!(
            "New weekly roundup from {} for week {}.",
            participant.display_name, week.number
        );
        let keyboard = Keyboard::single(Button::new(
            "See answers",
            ActionTag::SeeAnswers(participant.id.clone()),
        ));

        for admin in self.roster.all() {
            let conversation = ConversationId(admin.0.clone());
            if let Err(e) = self
                .transport
                .send(&conversation, &summary, Some(keyboard.clone()))
                .await
            {
                warn!(admin = %admin, error = %e, "admin notification failed");
            }
        }
    }

    // --- Operator command surface ---

    async fn handle_command(
        &self,
        event: &InboundEvent,
        text: &str,
    ) -> Result<(), RoundupError> {
        let Some(parsed) = commands::parse(text) else {
            debug!(participant = %event.participant.id, "ignoring unknown command");
            return Ok(());
        };

        let conversation = &event.conversation;
        let sender = &event.participant;

        let command = match parsed {
            Parsed::Malformed(usage) => return self.send_text(conversation, usage).await,
            Parsed::Command(command) => command,
        };

        let main_only = matches!(
            command,
            Command::AddAdmin(_)
                | Command::RemoveAdmin(_)
                | Command::Questions(CatalogAction::Add(_))
                | Command::Questions(CatalogAction::Remove(_))
        );
        let authorized = match command {
            Command::Start | Command::Help => true,
            _ if main_only => self.roster.is_main(&sender.id),
            _ => self.roster.is_admin(&sender.id),
        };
        if !authorized {
            let text = if main_only { MAIN_ADMIN_ONLY_TEXT } else { UNAUTHORIZED_TEXT };
            return self.send_text(conversation, text).await;
        }

        match command {
            Command::Start => {
                self.lifecycle
                    .show(&sender.id, conversation, START_TEXT, Some(start_keyboard()))
                    .await?;
                Ok(())
            }
            Command::Help => self.send_text(conversation, HELP_TEXT).await,
            Command::NewWeek => self.command_new_week(conversation).await,
            Command::ExportCsv => self.command_export_csv(conversation).await,
            Command::ListWeeks => self.command_list_weeks(conversation).await,
            Command::Answers(target) => self.send_latest(conversation, &target).await,
            Command::Broadcast(message) => self.command_broadcast(conversation, &message).await,
            Command::AddAdmin(id) => {
                let text = if self.roster.add(id.clone()) {
                    format!("User {id} has been added as a sub-admin.")
                } else {
                    format!("User {id} is already a sub-admin.")
                };
                self.send_text(conversation, &text).await
            }
            Command::RemoveAdmin(id) => {
                let text = if self.roster.remove(&id) {
                    format!("User {id} has been removed as a sub-admin.")
                } else {
                    format!("User {id} is not a sub-admin.")
                };
                self.send_text(conversation, &text).await
            }
            Command::Admins => {
                let roster = self
                    .roster
                    .all()
                    .iter()
                    .map(|p| p.0.clone())
                    .collect::<Vec<_>>()
                    .join("\n");
                self.send_text(conversation, &format!("Admins:\n{roster}")).await
            }
            Command::Questions(action) => self.command_questions(conversation, action).await,
        }
    }

    async fn command_new_week(&self, conversation: &ConversationId) -> Result<(), RoundupError> {
        let header = {
            let catalog = self.catalog.read().expect("catalog poisoned");
            catalog.header_row()
        };
        let share = self.share_with();
        match self.weeks.rotate(self.store.as_ref(), &header, &share).await {
            Ok(week) => {
                self.send_text(
                    conversation,
                    &format!(
                        "New week started! Responses will be saved to sheet: {}",
                        week.table
                    ),
                )
                .await
            }
            Err(e) => {
                warn!(error = %e, "manual week rotation failed");
                self.send_text(
                    conversation,
                    "Failed to create a new week sheet. Please try again later.",
                )
                .await
            }
        }
    }

    async fn command_export_csv(&self, conversation: &ConversationId) -> Result<(), RoundupError> {
        let Some(week) = self.weeks.active().await else {
            return self
                .send_text(conversation, "No active week yet. Use /newweek to create one.")
                .await;
        };

        match self.store.read_all_rows(&week.table).await {
            Ok(rows) => {
                let bytes = admin::rows_to_csv(&rows)?;
                self.transport
                    .send_document(
                        conversation,
                        &format!("week_{}_responses.csv", week.number),
                        bytes,
                        "Here is the CSV export for this week.",
                    )
                    .await
            }
            Err(e) => {
                warn!(error = %e, "csv export failed");
                self.send_text(
                    conversation,
                    "An error occurred while exporting the CSV. Please try again later.",
                )
                .await
            }
        }
    }

    async fn command_list_weeks(&self, conversation: &ConversationId) -> Result<(), RoundupError> {
        let weeks = self.weeks.list().await;
        if weeks.is_empty() {
            return self
                .send_text(conversation, "No weeks yet. Use /newweek to create one.")
                .await;
        }

        let mut lines = vec!["Weekly sheets:".to_string()];
        for week in &weeks {
            let link = self
                .store
                .share_url(&week.table)
                .unwrap_or_else(|| week.table.to_string());
            lines.push(format!("Week {}: {}", week.number, link));
        }
        self.send_text(conversation, &lines.join("\n")).await
    }

    async fn command_broadcast(
        &self,
        conversation: &ConversationId,
        message: &str,
    ) -> Result<(), RoundupError> {
        let Some(week) = self.weeks.active().await else {
            return self
                .send_text(conversation, "No active week yet, so there is no one to reach.")
                .await;
        };

        let rows = match self.store.read_all_rows(&week.table).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "broadcast recipient read failed");
                return self
                    .send_text(
                        conversation,
                        "Could not read this week's participants. Please try again later.",
                    )
                    .await;
            }
        };

        let recipients = admin::distinct_participants(&rows);
        let mut delivered = 0usize;
        for recipient in &recipients {
            // DM conversation ids equal participant ids on the platform.
            let target = ConversationId(recipient.0.clone());
            match self.transport.send(&target, message, None).await {
                Ok(_) => delivered += 1,
                Err(e) => {
                    warn!(recipient = %recipient, error = %e, "broadcast delivery failed");
                }
            }
        }

        self.send_text(
            conversation,
            &format!(
                "Broadcast delivered to {delivered} of {} participants.",
                recipients.len()
            ),
        )
        .await
    }

    async fn command_questions(
        &self,
        conversation: &ConversationId,
        action: CatalogAction,
    ) -> Result<(), RoundupError> {
        match action {
            CatalogAction::List => {
                let listing = {
                    let catalog = self.catalog.read().expect("catalog poisoned");
                    catalog.numbered_list()
                };
                self.send_text(conversation, &format!("Current questions:\n{listing}"))
                    .await
            }
            CatalogAction::Add(question) => {
                {
                    let mut catalog = self.catalog.write().expect("catalog poisoned");
                    catalog.add(question.clone());
                }
                self.send_text(conversation, &format!("New question added: {question}"))
                    .await
            }
            CatalogAction::Remove(position) => {
                let removed = {
                    let mut catalog = self.catalog.write().expect("catalog poisoned");
                    catalog.remove(position)
                };
                match removed {
                    Ok(question) => {
                        self.send_text(conversation, &format!("Question removed: {question}"))
                            .await
                    }
                    Err(e) => self.send_text(conversation, &format!("{e}")).await,
                }
            }
        }
    }

    /// Formats and sends a participant's latest submission to an admin.
    async fn send_latest(
        &self,
        conversation: &ConversationId,
        target: &ParticipantId,
    ) -> Result<(), RoundupError> {
        let Some(week) = self.weeks.active().await else {
            return self
                .send_text(conversation, "No submissions recorded yet this week.")
                .await;
        };

        let rows = match self.store.read_all_rows(&week.table).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "submission lookup failed");
                return self
                    .send_text(
                        conversation,
                        "Could not read this week's sheet. Please try again later.",
                    )
                    .await;
            }
        };

        let questions = {
            let catalog = self.catalog.read().expect("catalog poisoned");
            catalog.questions().to_vec()
        };

        match admin::latest_submission(&rows, target, &questions) {
            Some(latest) => {
                let mut lines = vec![
                    format!("Latest submission from {}", latest.display_name),
                    latest.timestamp.clone(),
                    String::new(),
                ];
                for (question, answer) in &latest.answers {
                    lines.push(question.clone());
                    lines.push(format!("> {answer}"));
                }
                self.send_text(conversation, &lines.join("\n")).await
            }
            None => {
                self.send_text(
                    conversation,
                    &format!("No submission found for user {target} this week."),
                )
                .await
            }
        }
    }
}

fn start_keyboard() -> Keyboard {
    Keyboard::single(Button::new(START_BUTTON_LABEL, ActionTag::StartForm))
}

/// Navigation controls for a question prompt: the first question offers a
/// way back to the start menu, later questions a way back to the previous
/// question (labels are 1-indexed for display).
fn question_keyboard(index: usize) -> Keyboard {
    if index == 0 {
        Keyboard::single(Button::new("Back to start", ActionTag::BackToStart))
    } else {
        Keyboard::single(Button::new(
            format!("Back to question {index}"),
            ActionTag::BackToQuestion(index - 1),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_keyboard_links_to_previous_question() {
        let kb = question_keyboard(3);
        assert_eq!(kb.rows[0][0].action, ActionTag::BackToQuestion(2));
        assert_eq!(kb.rows[0][0].label, "Back to question 3");
    }

    #[test]
    fn first_question_keyboard_goes_back_to_start() {
        let kb = question_keyboard(0);
        assert_eq!(kb.rows[0][0].action, ActionTag::BackToStart);
    }

    #[test]
    fn start_keyboard_carries_start_action() {
        let kb = start_keyboard();
        assert_eq!(kb.rows[0][0].action, ActionTag::StartForm);
    }
}
