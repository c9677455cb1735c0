// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core trait definitions, error types, and common types for the roundup
//! survey bot.
//!
//! This crate defines the seams the survey engine talks through: the
//! [`ChatTransport`] trait for the messaging platform and the
//! [`TableStore`] trait for the tabular storage backend, plus the shared
//! identifier newtypes, the inbound event model, and the callback action
//! tag codec.

pub mod action;
pub mod error;
pub mod traits;
pub mod types;

pub use action::ActionTag;
pub use error::RoundupError;
pub use traits::adapter::Adapter;
pub use traits::store::TableStore;
pub use traits::transport::ChatTransport;
