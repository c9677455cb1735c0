// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin roster and the read-side queries over stored submission rows.
//!
//! Rows are append-only: a participant who corrects a submission produces a
//! second row with a later timestamp, so "the" submission is always the row
//! with the maximum timestamp (ties broken by row order, later wins).

use std::collections::HashSet;
use std::sync::RwLock;

use roundup_core::RoundupError;
use roundup_core::types::ParticipantId;

/// Index of the timestamp column in a submission row
/// (`[User ID, Name, Username, Date, answers...]`).
const TIMESTAMP_COLUMN: usize = 3;
/// Index of the first answer column.
const FIRST_ANSWER_COLUMN: usize = 4;

/// The operator roster: one main admin plus a mutable set of sub-admins.
///
/// Only the main admin may mutate the roster or the question catalog; any
/// admin may rotate weeks, export, broadcast, and review submissions.
pub struct AdminRoster {
    main: ParticipantId,
    subs: RwLock<HashSet<ParticipantId>>,
}

impl AdminRoster {
    pub fn new(main: ParticipantId, initial: Vec<ParticipantId>) -> Self {
        let subs = initial.into_iter().filter(|p| *p != main).collect();
        Self {
            main,
            subs: RwLock::new(subs),
        }
    }

    pub fn is_main(&self, participant: &ParticipantId) -> bool {
        *participant == self.main
    }

    pub fn is_admin(&self, participant: &ParticipantId) -> bool {
        self.is_main(participant)
            || self
                .subs
                .read()
                .expect("roster poisoned")
                .contains(participant)
    }

    /// Adds a sub-admin. Returns false if already on the roster.
    pub fn add(&self, participant: ParticipantId) -> bool {
        if participant == self.main {
            return false;
        }
        self.subs.write().expect("roster poisoned").insert(participant)
    }

    /// Removes a sub-admin. Returns false if not on the roster (the main
    /// admin cannot be removed).
    pub fn remove(&self, participant: &ParticipantId) -> bool {
        self.subs.write().expect("roster poisoned").remove(participant)
    }

    /// Every admin id: the main admin first, then sub-admins in sorted
    /// order for deterministic fan-out.
    pub fn all(&self) -> Vec<ParticipantId> {
        let subs = self.subs.read().expect("roster poisoned");
        let mut out = vec![self.main.clone()];
        let mut sorted: Vec<_> = subs.iter().cloned().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        out.extend(sorted);
        out
    }
}

/// A participant's most recent submission, paired with the current catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestSubmission {
    pub display_name: String,
    pub timestamp: String,
    /// `(question, answer)` pairs, truncated to the shorter of the row's
    /// answer values and the current catalog. When the catalog changed
    /// after the row was written the pairing is positional and lossy;
    /// accepted behavior, not an error.
    pub answers: Vec<(String, String)>,
}

/// Selects the participant's latest submission from the full row set.
///
/// The timestamp format sorts lexicographically in chronological order, so
/// a plain string comparison suffices; `>=` makes a later row win ties.
pub fn latest_submission(
    rows: &[Vec<String>],
    participant: &ParticipantId,
    questions: &[String],
) -> Option<LatestSubmission> {
    let mut best: Option<&Vec<String>> = None;

    for row in rows.iter().skip(1) {
        if row.first().map(String::as_str) != Some(participant.0.as_str()) {
            continue;
        }
        let ts = row.get(TIMESTAMP_COLUMN).map(String::as_str).unwrap_or("");
        let best_ts = best
            .and_then(|r| r.get(TIMESTAMP_COLUMN))
            .map(String::as_str)
            .unwrap_or("");
        if best.is_none() || ts >= best_ts {
            best = Some(row);
        }
    }

    let row = best?;
    let values = row.get(FIRST_ANSWER_COLUMN..).unwrap_or(&[]);
    let answers = questions
        .iter()
        .zip(values.iter())
        .map(|(q, a)| (q.clone(), a.clone()))
        .collect();

    Some(LatestSubmission {
        display_name: row.get(1).cloned().unwrap_or_default(),
        timestamp: row.get(TIMESTAMP_COLUMN).cloned().unwrap_or_default(),
        answers,
    })
}

/// Unique participant ids from the first column, header row excluded,
/// in first-seen order.
pub fn distinct_participants(rows: &[Vec<String>]) -> Vec<ParticipantId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in rows.iter().skip(1) {
        if let Some(id) = row.first()
            && !id.is_empty()
            && seen.insert(id.clone())
        {
            out.push(ParticipantId(id.clone()));
        }
    }
    out
}

/// Serializes the full row set into CSV bytes for export.
///
/// Rows may be ragged (the catalog can change shape between submissions),
/// so the writer runs in flexible mode.
pub fn rows_to_csv(rows: &[Vec<String>]) -> Result<Vec<u8>, RoundupError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| RoundupError::Internal(format!("csv serialization failed: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| RoundupError::Internal(format!("csv serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ParticipantId {
        ParticipantId(s.to_string())
    }

    fn row(id: &str, name: &str, ts: &str, answers: &[&str]) -> Vec<String> {
        let mut r = vec![
            id.to_string(),
            name.to_string(),
            "N/A".to_string(),
            ts.to_string(),
        ];
        r.extend(answers.iter().map(|a| a.to_string()));
        r
    }

    fn header() -> Vec<String> {
        ["User ID", "Name", "Username", "Date", "q1", "q2"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn roster_main_is_admin_but_not_sub() {
        let roster = AdminRoster::new(pid("1"), vec![pid("2")]);
        assert!(roster.is_main(&pid("1")));
        assert!(roster.is_admin(&pid("1")));
        assert!(roster.is_admin(&pid("2")));
        assert!(!roster.is_admin(&pid("3")));
    }

    #[test]
    fn roster_add_and_remove() {
        let roster = AdminRoster::new(pid("1"), vec![]);
        assert!(roster.add(pid("2")));
        assert!(!roster.add(pid("2")));
        assert!(!roster.add(pid("1"))); // the main admin is not a sub
        assert!(roster.remove(&pid("2")));
        assert!(!roster.remove(&pid("2")));
        assert!(!roster.remove(&pid("1")));
    }

    #[test]
    fn roster_all_lists_main_first() {
        let roster = AdminRoster::new(pid("9"), vec![pid("3"), pid("1")]);
        assert_eq!(roster.all(), vec![pid("9"), pid("1"), pid("3")]);
    }

    #[test]
    fn latest_picks_maximum_timestamp() {
        let rows = vec![
            header(),
            row("7", "Ada", "2026-01-05 10:00:00", &["old a", "old b"]),
            row("8", "Grace", "2026-01-06 09:00:00", &["other"]),
            row("7", "Ada", "2026-01-06 11:30:00", &["new a", "new b"]),
        ];
        let latest =
            latest_submission(&rows, &pid("7"), &["q1".into(), "q2".into()]).unwrap();
        assert_eq!(latest.display_name, "Ada");
        assert_eq!(latest.timestamp, "2026-01-06 11:30:00");
        assert_eq!(
            latest.answers,
            vec![
                ("q1".to_string(), "new a".to_string()),
                ("q2".to_string(), "new b".to_string())
            ]
        );
    }

    #[test]
    fn latest_ties_broken_by_later_row() {
        let rows = vec![
            header(),
            row("7", "Ada", "2026-01-06 11:30:00", &["first"]),
            row("7", "Ada", "2026-01-06 11:30:00", &["second"]),
        ];
        let latest = latest_submission(&rows, &pid("7"), &["q1".into()]).unwrap();
        assert_eq!(latest.answers[0].1, "second");
    }

    #[test]
    fn latest_pairs_truncate_to_shorter_side() {
        // Row written under an older, shorter catalog: only one answer.
        let rows = vec![
            header(),
            row("7", "Ada", "2026-01-05 10:00:00", &["only answer"]),
        ];
        let latest =
            latest_submission(&rows, &pid("7"), &["q1".into(), "q2".into()]).unwrap();
        assert_eq!(latest.answers.len(), 1);

        // Row with more answers than the current catalog: extra values drop.
        let rows = vec![
            header(),
            row("7", "Ada", "2026-01-05 10:00:00", &["a", "b", "c"]),
        ];
        let latest = latest_submission(&rows, &pid("7"), &["q1".into()]).unwrap();
        assert_eq!(latest.answers.len(), 1);
    }

    #[test]
    fn latest_none_for_unknown_participant() {
        let rows = vec![header(), row("7", "Ada", "2026-01-05 10:00:00", &["a"])];
        assert!(latest_submission(&rows, &pid("99"), &["q1".into()]).is_none());
    }

    #[test]
    fn distinct_skips_header_and_dedupes() {
        let rows = vec![
            header(),
            row("7", "Ada", "2026-01-05 10:00:00", &["a"]),
            row("8", "Grace", "2026-01-05 11:00:00", &["b"]),
            row("7", "Ada", "2026-01-06 10:00:00", &["c"]),
        ];
        assert_eq!(distinct_participants(&rows), vec![pid("7"), pid("8")]);
    }

    #[test]
    fn distinct_of_header_only_is_empty() {
        assert!(distinct_participants(&[header()]).is_empty());
    }

    #[test]
    fn csv_round_trip_preserves_cells() {
        let rows = vec![
            header(),
            row("7", "Ada, the first", "2026-01-05 10:00:00", &["line\nbreak", "b"]),
        ];
        let bytes = rows_to_csv(&rows).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());
        let parsed: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|c| c.to_string()).collect())
            .collect();
        assert_eq!(parsed, rows);
    }
}
