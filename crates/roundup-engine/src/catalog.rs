// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ordered, mutable list of survey questions.

use roundup_core::RoundupError;

/// Column headers that precede the per-question columns in every sheet.
pub const FIXED_HEADERS: [&str; 4] = ["User ID", "Name", "Username", "Date"];

/// Ordered list of survey prompts, 1-indexed for display.
///
/// Mutated only by the main admin. The catalog is never allowed to become
/// empty: the survey flow and the sheet header both assume at least one
/// question.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<String>,
}

impl Catalog {
    /// Builds a catalog from the configured question list.
    pub fn new(questions: Vec<String>) -> Result<Self, RoundupError> {
        if questions.is_empty() {
            return Err(RoundupError::Config(
                "the question catalog must not be empty".to_string(),
            ));
        }
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The prompt text for question `index` (zero-based).
    pub fn prompt(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    /// Appends a question to the end of the catalog.
    pub fn add(&mut self, question: String) {
        self.questions.push(question);
    }

    /// Removes the question at 1-based display `position`, re-indexing the
    /// rest. Refuses to empty the catalog.
    pub fn remove(&mut self, position: usize) -> Result<String, RoundupError> {
        if position == 0 || position > self.questions.len() {
            return Err(RoundupError::Config(format!(
                "invalid question number {position}, expected 1..={}",
                self.questions.len()
            )));
        }
        if self.questions.len() == 1 {
            return Err(RoundupError::Config(
                "cannot remove the last remaining question".to_string(),
            ));
        }
        Ok(self.questions.remove(position - 1))
    }

    /// All questions in order.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Human-facing numbered listing of the catalog.
    pub fn numbered_list(&self) -> String {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}) {q}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The sheet header row for the current catalog shape.
    pub fn header_row(&self) -> Vec<String> {
        FIXED_HEADERS
            .iter()
            .map(|h| h.to_string())
            .chain(self.questions.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec!["q1".into(), "q2".into(), "q3".into()]).unwrap()
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(Catalog::new(vec![]).is_err());
    }

    #[test]
    fn add_appends_to_end() {
        let mut c = catalog();
        c.add("q4".into());
        assert_eq!(c.len(), 4);
        assert_eq!(c.prompt(3), Some("q4"));
    }

    #[test]
    fn remove_reindexes_subsequent_questions() {
        let mut c = catalog();
        let removed = c.remove(2).unwrap();
        assert_eq!(removed, "q2");
        assert_eq!(c.prompt(1), Some("q3"));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn remove_rejects_out_of_range_positions() {
        let mut c = catalog();
        assert!(c.remove(0).is_err());
        assert!(c.remove(4).is_err());
    }

    #[test]
    fn remove_refuses_to_empty_the_catalog() {
        let mut c = Catalog::new(vec!["only".into()]).unwrap();
        assert!(c.remove(1).is_err());
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn header_row_is_fixed_columns_then_questions() {
        let c = catalog();
        assert_eq!(
            c.header_row(),
            vec!["User ID", "Name", "Username", "Date", "q1", "q2", "q3"]
        );
    }

    #[test]
    fn numbered_list_is_one_indexed() {
        let c = catalog();
        assert_eq!(c.numbered_list(), "1) q1\n2) q2\n3) q3");
    }
}
