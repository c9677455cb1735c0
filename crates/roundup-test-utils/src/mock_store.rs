// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory tabular store for deterministic testing.
//!
//! `MockStore` implements `TableStore` with in-memory tables, a grant log,
//! and scriptable transient failures for the commit-retry paths.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use roundup_core::traits::adapter::Adapter;
use roundup_core::traits::store::TableStore;
use roundup_core::types::{AccessRole, AdapterType, HealthStatus, TableId};
use roundup_core::RoundupError;

#[derive(Debug, Clone)]
struct MockTable {
    title: String,
    rows: Vec<Vec<String>>,
}

/// A mock tabular store for testing.
pub struct MockStore {
    tables: Arc<Mutex<HashMap<TableId, MockTable>>>,
    created_order: Arc<Mutex<Vec<TableId>>>,
    grants: Arc<Mutex<Vec<(TableId, String, String)>>>,
    counter: AtomicU64,
    fail_creates: AtomicU32,
    fail_appends: AtomicU32,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(HashMap::new())),
            created_order: Arc::new(Mutex::new(Vec::new())),
            grants: Arc::new(Mutex::new(Vec::new())),
            counter: AtomicU64::new(0),
            fail_creates: AtomicU32::new(0),
            fail_appends: AtomicU32::new(0),
        }
    }

    /// Make the next `n` `create_table` calls fail.
    pub fn fail_next_creates(&self, n: u32) {
        self.fail_creates.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` `append_row` calls fail.
    pub fn fail_next_appends(&self, n: u32) {
        self.fail_appends.store(n, Ordering::SeqCst);
    }

    /// Ids of every created table, in creation order.
    pub async fn table_ids(&self) -> Vec<TableId> {
        self.created_order.lock().await.clone()
    }

    /// Number of tables created.
    pub async fn table_count(&self) -> usize {
        self.created_order.lock().await.len()
    }

    /// The rows of a table (header included), or empty if unknown.
    pub async fn rows_of(&self, table: &TableId) -> Vec<Vec<String>> {
        self.tables
            .lock()
            .await
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// The title a table was created with.
    pub async fn title_of(&self, table: &TableId) -> Option<String> {
        self.tables.lock().await.get(table).map(|t| t.title.clone())
    }

    /// Every `(table, email, role)` grant issued so far.
    pub async fn grants(&self) -> Vec<(TableId, String, String)> {
        self.grants.lock().await.clone()
    }

    fn take_failure(slot: &AtomicU32) -> bool {
        slot.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, RoundupError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RoundupError> {
        Ok(())
    }
}

#[async_trait]
impl TableStore for MockStore {
    async fn create_table(&self, title: &str, header: &[String]) -> Result<TableId, RoundupError> {
        if Self::take_failure(&self.fail_creates) {
            return Err(RoundupError::storage("mock create failure"));
        }
        let id = TableId(format!(
            "sheet-{}",
            self.counter.fetch_add(1, Ordering::SeqCst) + 1
        ));
        self.tables.lock().await.insert(
            id.clone(),
            MockTable {
                title: title.to_string(),
                rows: vec![header.to_vec()],
            },
        );
        self.created_order.lock().await.push(id.clone());
        Ok(id)
    }

    async fn grant_access(
        &self,
        table: &TableId,
        email: &str,
        role: AccessRole,
    ) -> Result<(), RoundupError> {
        self.grants
            .lock()
            .await
            .push((table.clone(), email.to_string(), role.as_str().to_string()));
        Ok(())
    }

    async fn append_row(&self, table: &TableId, row: &[String]) -> Result<(), RoundupError> {
        if Self::take_failure(&self.fail_appends) {
            return Err(RoundupError::storage("mock append failure"));
        }
        let mut tables = self.tables.lock().await;
        let Some(entry) = tables.get_mut(table) else {
            return Err(RoundupError::storage(format!("unknown table {table}")));
        };
        entry.rows.push(row.to_vec());
        Ok(())
    }

    async fn read_all_rows(&self, table: &TableId) -> Result<Vec<Vec<String>>, RoundupError> {
        let tables = self.tables.lock().await;
        tables
            .get(table)
            .map(|t| t.rows.clone())
            .ok_or_else(|| RoundupError::storage(format!("unknown table {table}")))
    }

    fn identity(&self) -> Option<String> {
        Some("service@mock-store.test".to_string())
    }

    fn share_url(&self, table: &TableId) -> Option<String> {
        Some(format!("https://sheets.mock/{table}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec!["User ID".into(), "Name".into()]
    }

    #[tokio::test]
    async fn create_append_read_round_trip() {
        let store = MockStore::new();
        let table = store.create_table("Week 1 Responses", &header()).await.unwrap();
        store
            .append_row(&table, &["7".into(), "Ada".into()])
            .await
            .unwrap();

        let rows = store.read_all_rows(&table).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], header());
        assert_eq!(rows[1], vec!["7".to_string(), "Ada".to_string()]);
        assert_eq!(store.title_of(&table).await.as_deref(), Some("Week 1 Responses"));
    }

    #[tokio::test]
    async fn scripted_append_failure_is_transient() {
        let store = MockStore::new();
        let table = store.create_table("t", &header()).await.unwrap();
        store.fail_next_appends(1);

        assert!(store.append_row(&table, &["a".into()]).await.is_err());
        assert!(store.append_row(&table, &["a".into()]).await.is_ok());
        assert_eq!(store.rows_of(&table).await.len(), 2);
    }

    #[tokio::test]
    async fn scripted_create_failure_is_transient() {
        let store = MockStore::new();
        store.fail_next_creates(1);
        assert!(store.create_table("t", &header()).await.is_err());
        assert!(store.create_table("t", &header()).await.is_ok());
        assert_eq!(store.table_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_table_reads_error() {
        let store = MockStore::new();
        assert!(store.read_all_rows(&TableId("nope".into())).await.is_err());
    }

    #[tokio::test]
    async fn grants_are_logged() {
        let store = MockStore::new();
        let table = store.create_table("t", &header()).await.unwrap();
        store
            .grant_access(&table, "owner@example.com", AccessRole::Writer)
            .await
            .unwrap();
        let grants = store.grants().await;
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].1, "owner@example.com");
        assert_eq!(grants[0].2, "writer");
    }
}
