// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for roundup integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without Telegram or Google Sheets.
//!
//! # Components
//!
//! - [`MockTransport`] - Mock chat transport with event injection and
//!   outbound capture
//! - [`MockStore`] - In-memory tabular store with injectable failures
//! - [`TestHarness`] - A full [`roundup_engine::SurveyService`] wired over
//!   both mocks

pub mod harness;
pub mod mock_store;
pub mod mock_transport;

pub use harness::TestHarness;
pub use mock_store::MockStore;
pub use mock_transport::MockTransport;
