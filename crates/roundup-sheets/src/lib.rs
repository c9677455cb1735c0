// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Sheets tabular store adapter for the roundup survey bot.
//!
//! Implements [`roundup_core::TableStore`] against the Sheets v4 and
//! Drive v3 REST APIs with service-account authentication (RS256 JWT
//! exchanged for a cached access token).

pub mod auth;
pub mod client;
pub mod types;

pub use auth::ServiceAccountKey;
pub use client::SheetsClient;
