// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Week registry: rotation policy and sheet allocation.
//!
//! A week is a rotation unit during which submissions accumulate into one
//! sheet. Staleness is rolling -- a week goes stale a fixed number of days
//! after its sheet was created, with no calendar alignment -- and is
//! checked lazily at commit time rather than on a timer. If no submissions
//! arrive for a while, no rotation happens until the next one does; that is
//! accepted behavior.

use chrono::{DateTime, Duration, Utc};
use roundup_core::types::{AccessRole, TableId};
use roundup_core::{RoundupError, TableStore};
use tracing::info;

/// Timestamp format used in submission rows: fixed precision to the second,
/// lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One rotation unit and its sheet.
#[derive(Debug, Clone)]
pub struct Week {
    /// Monotonically increasing week number, starting at 1.
    pub number: u32,
    /// The sheet submissions for this week are appended to.
    pub table: TableId,
    /// When the sheet was created; the staleness clock starts here.
    pub created_at: DateTime<Utc>,
}

/// Registry of all weeks created during this process lifetime.
///
/// The registry lock is held across the staleness check *and* the sheet
/// creation, so two near-simultaneous completions against a stale week
/// cannot both rotate: the second caller waits and then observes the first
/// caller's freshly created week as active.
pub struct WeekRegistry {
    inner: tokio::sync::Mutex<Vec<Week>>,
    rotation: Duration,
}

impl WeekRegistry {
    pub fn new(rotation_days: u64) -> Self {
        Self {
            inner: tokio::sync::Mutex::new(Vec::new()),
            rotation: Duration::days(rotation_days as i64),
        }
    }

    /// Returns the active week, rotating first if there is none yet or the
    /// active one has gone stale.
    pub async fn ensure_fresh(
        &self,
        store: &dyn TableStore,
        header: &[String],
        share_with: &[String],
    ) -> Result<Week, RoundupError> {
        let mut weeks = self.inner.lock().await;

        if let Some(active) = weeks.last()
            && !is_stale(active, self.rotation)
        {
            return Ok(active.clone());
        }

        let number = weeks.last().map(|w| w.number + 1).unwrap_or(1);
        let week = create_week(store, number, header, share_with).await?;
        weeks.push(week.clone());
        Ok(week)
    }

    /// Operator-triggered rotation: allocates the next week unconditionally,
    /// even while the current one is still fresh.
    pub async fn rotate(
        &self,
        store: &dyn TableStore,
        header: &[String],
        share_with: &[String],
    ) -> Result<Week, RoundupError> {
        let mut weeks = self.inner.lock().await;
        let number = weeks.last().map(|w| w.number + 1).unwrap_or(1);
        let week = create_week(store, number, header, share_with).await?;
        weeks.push(week.clone());
        Ok(week)
    }

    /// The most recently created week, if any.
    pub async fn active(&self) -> Option<Week> {
        self.inner.lock().await.last().cloned()
    }

    /// All weeks in creation order.
    pub async fn list(&self) -> Vec<Week> {
        self.inner.lock().await.clone()
    }
}

/// Creates the sheet for week `number` and shares it with each listed
/// identity. The week is recorded only if every step succeeds; a half-built
/// sheet is abandoned and the next attempt allocates a fresh one.
async fn create_week(
    store: &dyn TableStore,
    number: u32,
    header: &[String],
    share_with: &[String],
) -> Result<Week, RoundupError> {
    let title = format!("Week {number} Responses");
    let table = store.create_table(&title, header).await?;

    for email in share_with {
        store.grant_access(&table, email, AccessRole::Writer).await?;
    }

    info!(week = number, table = %table, "created new week sheet");

    Ok(Week {
        number,
        table,
        created_at: Utc::now(),
    })
}

fn is_stale(week: &Week, rotation: Duration) -> bool {
    Utc::now() - week.created_at > rotation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week_aged(days: i64) -> Week {
        Week {
            number: 1,
            table: TableId("sheet-1".into()),
            created_at: Utc::now() - Duration::days(days),
        }
    }

    #[test]
    fn fresh_week_is_not_stale() {
        assert!(!is_stale(&week_aged(0), Duration::days(7)));
        assert!(!is_stale(&week_aged(6), Duration::days(7)));
    }

    #[test]
    fn week_past_the_window_is_stale() {
        assert!(is_stale(&week_aged(8), Duration::days(7)));
    }

    #[test]
    fn exactly_at_the_boundary_is_not_stale() {
        // The window is exclusive: staleness requires strictly more than
        // `rotation` elapsed. A week created exactly seven days ago (to the
        // nanosecond) would still be fresh; clock skew makes this untestable
        // at the boundary itself, so probe just inside it.
        let week = Week {
            number: 1,
            table: TableId("sheet-1".into()),
            created_at: Utc::now() - Duration::days(7) + Duration::seconds(5),
        };
        assert!(!is_stale(&week, Duration::days(7)));
    }

    #[tokio::test]
    async fn registry_starts_empty() {
        let registry = WeekRegistry::new(7);
        assert!(registry.active().await.is_none());
        assert!(registry.list().await.is_empty());
    }
}
