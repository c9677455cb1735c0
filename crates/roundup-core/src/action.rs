// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Callback action tags round-tripped through the transport as opaque strings.
//!
//! Inline buttons carry these tags as their callback data. Because the data
//! comes back from the platform (and could be stale or tampered with),
//! [`ActionTag::decode`] is strict: anything that does not parse exactly is
//! rejected and the press is ignored upstream.

use crate::types::ParticipantId;

const START_FORM: &str = "start_form";
const BACK_TO_START: &str = "back_to_start";
const BACK_TO_QUESTION: &str = "back_to_question_";
const SEE_ANSWERS: &str = "see_answers_";

/// Actions a button press can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTag {
    /// Begin (or restart) the survey form.
    StartForm,
    /// Abandon the in-progress form and return to the start menu.
    BackToStart,
    /// Revise the answer to question `0..N` (zero-based index).
    BackToQuestion(usize),
    /// Show an admin the latest submission of the given participant.
    SeeAnswers(ParticipantId),
}

impl ActionTag {
    /// Encode the tag into its callback-data string.
    pub fn encode(&self) -> String {
        match self {
            ActionTag::StartForm => START_FORM.to_string(),
            ActionTag::BackToStart => BACK_TO_START.to_string(),
            ActionTag::BackToQuestion(i) => format!("{BACK_TO_QUESTION}{i}"),
            ActionTag::SeeAnswers(p) => format!("{SEE_ANSWERS}{p}"),
        }
    }

    /// Decode callback data back into a tag.
    ///
    /// Returns `None` for unknown or malformed data.
    pub fn decode(data: &str) -> Option<ActionTag> {
        match data {
            START_FORM => return Some(ActionTag::StartForm),
            BACK_TO_START => return Some(ActionTag::BackToStart),
            _ => {}
        }

        if let Some(index) = data.strip_prefix(BACK_TO_QUESTION) {
            return index.parse::<usize>().ok().map(ActionTag::BackToQuestion);
        }

        if let Some(id) = data.strip_prefix(SEE_ANSWERS) {
            if id.is_empty() {
                return None;
            }
            return Some(ActionTag::SeeAnswers(ParticipantId(id.to_string())));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        let tags = [
            ActionTag::StartForm,
            ActionTag::BackToStart,
            ActionTag::BackToQuestion(0),
            ActionTag::BackToQuestion(12),
            ActionTag::SeeAnswers(ParticipantId("987654".into())),
        ];
        for tag in tags {
            assert_eq!(ActionTag::decode(&tag.encode()), Some(tag));
        }
    }

    #[test]
    fn rejects_unknown_data() {
        assert_eq!(ActionTag::decode(""), None);
        assert_eq!(ActionTag::decode("launch_missiles"), None);
        assert_eq!(ActionTag::decode("start_form_v2"), None);
    }

    #[test]
    fn rejects_malformed_question_index() {
        assert_eq!(ActionTag::decode("back_to_question_"), None);
        assert_eq!(ActionTag::decode("back_to_question_minus1"), None);
        assert_eq!(ActionTag::decode("back_to_question_-1"), None);
    }

    #[test]
    fn rejects_empty_participant() {
        assert_eq!(ActionTag::decode("see_answers_"), None);
    }
}
