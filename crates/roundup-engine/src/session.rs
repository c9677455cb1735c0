// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-participant FSM that tracks progress through the question catalog.
//!
//! Each participant moves through states: no session -> asking question i ->
//! ready to persist -> no session. A session exists in the map if and only
//! if the participant has an incomplete submission; it is removed only on
//! explicit cancellation or after the completed submission has actually been
//! persisted. A storage failure therefore leaves the full answer set in
//! place and the participant can retry without re-answering.

use std::collections::HashMap;
use std::sync::Mutex;

use roundup_core::RoundupError;
use roundup_core::types::ParticipantId;

/// Result of recording one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The participant has no active session. Expected branch, not an
    /// error: the caller prompts them to begin.
    NotStarted,
    /// The answer was recorded; ask question `index` next (zero-based).
    Next(usize),
    /// All questions are answered. The session stays in the map until the
    /// caller confirms persistence via [`SessionEngine::finalize`].
    Complete(Vec<String>),
}

/// Result of a backward navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Answers were truncated; re-ask the target question.
    Moved,
    /// No session to navigate within.
    NotStarted,
}

/// Observable phase of a participant's session, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    /// Waiting on the answer to question `i` (zero-based).
    Asking(usize),
    /// All answers collected, persistence pending.
    ReadyToPersist,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not-started"),
            Phase::Asking(i) => write!(f, "asking({i})"),
            Phase::ReadyToPersist => write!(f, "ready-to-persist"),
        }
    }
}

/// Tracks every participant's in-progress answer sequence.
///
/// The map is guarded by a plain mutex; every operation is a short,
/// non-awaiting critical section. Per-participant serialization across the
/// surrounding I/O is the caller's job (the service holds a per-participant
/// entry lock around each interaction).
#[derive(Default)]
pub struct SessionEngine {
    inner: Mutex<HashMap<ParticipantId, Vec<String>>>,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session for the participant, overwriting any prior
    /// one. Returns the index of the first question.
    pub fn begin(&self, participant: &ParticipantId) -> usize {
        let mut map = self.inner.lock().expect("session map poisoned");
        map.insert(participant.clone(), Vec::new());
        0
    }

    /// Appends `text` to the participant's answers.
    ///
    /// A full session (all `question_count` answers present) does not grow
    /// further; it re-yields [`AnswerOutcome::Complete`] so a failed commit
    /// can be retried by re-sending the final answer.
    pub fn record_answer(
        &self,
        participant: &ParticipantId,
        text: &str,
        question_count: usize,
    ) -> AnswerOutcome {
        let mut map = self.inner.lock().expect("session map poisoned");
        let Some(answers) = map.get_mut(participant) else {
            return AnswerOutcome::NotStarted;
        };

        if answers.len() < question_count {
            answers.push(text.to_string());
        }

        if answers.len() >= question_count {
            AnswerOutcome::Complete(answers.clone())
        } else {
            AnswerOutcome::Next(answers.len())
        }
    }

    /// Truncates the participant's answers so that question `target` is
    /// asked next, discarding every answer at index `target` and beyond.
    ///
    /// `target` comes back from the transport as opaque callback data, so
    /// it is bounds-checked here even though well-formed buttons never
    /// produce an out-of-range value.
    pub fn navigate_back(
        &self,
        participant: &ParticipantId,
        target: usize,
        question_count: usize,
    ) -> Result<NavOutcome, RoundupError> {
        if target >= question_count {
            return Err(RoundupError::InvalidNavigation {
                target,
                len: question_count,
            });
        }

        let mut map = self.inner.lock().expect("session map poisoned");
        let Some(answers) = map.get_mut(participant) else {
            return Ok(NavOutcome::NotStarted);
        };
        answers.truncate(target);
        Ok(NavOutcome::Moved)
    }

    /// Removes the participant's session after a successful persist.
    /// Returns whether a session existed.
    pub fn finalize(&self, participant: &ParticipantId) -> bool {
        let mut map = self.inner.lock().expect("session map poisoned");
        map.remove(participant).is_some()
    }

    /// Removes any session for the participant. No-op if none existed.
    pub fn cancel(&self, participant: &ParticipantId) {
        let mut map = self.inner.lock().expect("session map poisoned");
        map.remove(participant);
    }

    /// The participant's current phase.
    pub fn phase(&self, participant: &ParticipantId, question_count: usize) -> Phase {
        let map = self.inner.lock().expect("session map poisoned");
        match map.get(participant) {
            None => Phase::NotStarted,
            Some(answers) if answers.len() >= question_count => Phase::ReadyToPersist,
            Some(answers) => Phase::Asking(answers.len()),
        }
    }

    /// Number of active sessions.
    pub fn active_count(&self) -> usize {
        self.inner.lock().expect("session map poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ParticipantId {
        ParticipantId(s.to_string())
    }

    #[test]
    fn forward_flow_completes_after_all_answers() {
        let engine = SessionEngine::new();
        let p = pid("1");
        assert_eq!(engine.begin(&p), 0);
        assert_eq!(engine.record_answer(&p, "a", 2), AnswerOutcome::Next(1));
        assert_eq!(
            engine.record_answer(&p, "b", 2),
            AnswerOutcome::Complete(vec!["a".into(), "b".into()])
        );
        // Session retained until finalize confirms persistence.
        assert_eq!(engine.phase(&p, 2), Phase::ReadyToPersist);
        assert!(engine.finalize(&p));
        assert_eq!(engine.phase(&p, 2), Phase::NotStarted);
    }

    #[test]
    fn answer_without_begin_is_not_started_and_mutates_nothing() {
        let engine = SessionEngine::new();
        let p = pid("1");
        assert_eq!(engine.record_answer(&p, "a", 2), AnswerOutcome::NotStarted);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn begin_resets_prior_answers() {
        let engine = SessionEngine::new();
        let p = pid("1");
        engine.begin(&p);
        engine.record_answer(&p, "a", 3);
        assert_eq!(engine.begin(&p), 0);
        assert_eq!(engine.phase(&p, 3), Phase::Asking(0));
    }

    #[test]
    fn navigate_back_truncates_to_target() {
        let engine = SessionEngine::new();
        let p = pid("1");
        engine.begin(&p);
        engine.record_answer(&p, "a", 3);
        engine.record_answer(&p, "b", 3);
        assert_eq!(engine.navigate_back(&p, 0, 3).unwrap(), NavOutcome::Moved);
        assert_eq!(engine.phase(&p, 3), Phase::Asking(0));
        // The discarded forward path never reappears.
        assert_eq!(engine.record_answer(&p, "x", 3), AnswerOutcome::Next(1));
        assert_eq!(engine.record_answer(&p, "y", 3), AnswerOutcome::Next(2));
        assert_eq!(
            engine.record_answer(&p, "z", 3),
            AnswerOutcome::Complete(vec!["x".into(), "y".into(), "z".into()])
        );
    }

    #[test]
    fn navigate_back_out_of_range_is_rejected() {
        let engine = SessionEngine::new();
        let p = pid("1");
        engine.begin(&p);
        let err = engine.navigate_back(&p, 5, 3).unwrap_err();
        assert!(matches!(
            err,
            RoundupError::InvalidNavigation { target: 5, len: 3 }
        ));
        // The rejected action left the session untouched.
        assert_eq!(engine.phase(&p, 3), Phase::Asking(0));
    }

    #[test]
    fn navigate_back_without_session_reports_not_started() {
        let engine = SessionEngine::new();
        assert_eq!(
            engine.navigate_back(&pid("1"), 0, 3).unwrap(),
            NavOutcome::NotStarted
        );
    }

    #[test]
    fn full_session_re_yields_complete_without_growing() {
        let engine = SessionEngine::new();
        let p = pid("1");
        engine.begin(&p);
        engine.record_answer(&p, "a", 1);
        // Simulated failed commit: the session is still there. A retry
        // re-yields the same answers without appending.
        let retry = engine.record_answer(&p, "a", 1);
        assert_eq!(retry, AnswerOutcome::Complete(vec!["a".into()]));
    }

    #[test]
    fn cancel_removes_session() {
        let engine = SessionEngine::new();
        let p = pid("1");
        engine.begin(&p);
        engine.cancel(&p);
        assert_eq!(engine.phase(&p, 4), Phase::NotStarted);
        // Cancelling again is harmless.
        engine.cancel(&p);
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::NotStarted.to_string(), "not-started");
        assert_eq!(Phase::Asking(2).to_string(), "asking(2)");
        assert_eq!(Phase::ReadyToPersist.to_string(), "ready-to-persist");
    }
}
