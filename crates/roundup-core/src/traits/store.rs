// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tabular store trait for the submission storage backend.

use async_trait::async_trait;

use crate::error::RoundupError;
use crate::traits::adapter::Adapter;
use crate::types::{AccessRole, TableId};

/// Seam to the tabular storage backend (Google Sheets in production).
///
/// Tables are append-only from the engine's point of view: rows are never
/// updated or deleted, and corrections arrive as new rows with a later
/// timestamp.
#[async_trait]
pub trait TableStore: Adapter {
    /// Creates a new table with the given title and header row, returning
    /// its identifier.
    async fn create_table(&self, title: &str, header: &[String]) -> Result<TableId, RoundupError>;

    /// Grants `email` the given role on a table.
    async fn grant_access(
        &self,
        table: &TableId,
        email: &str,
        role: AccessRole,
    ) -> Result<(), RoundupError>;

    /// Appends one row of values to a table.
    async fn append_row(&self, table: &TableId, row: &[String]) -> Result<(), RoundupError>;

    /// Reads every row of a table in order, header row included.
    async fn read_all_rows(&self, table: &TableId) -> Result<Vec<Vec<String>>, RoundupError>;

    /// The backend's own identity (service account email), if it has one.
    ///
    /// Newly created tables are shared with this identity so the backend
    /// keeps write access to its own spreadsheets.
    fn identity(&self) -> Option<String> {
        None
    }

    /// A human-facing URL for a table, if the backend can produce one.
    fn share_url(&self, _table: &TableId) -> Option<String> {
        None
    }
}
