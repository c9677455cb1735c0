// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits the survey engine consumes as trait objects.

pub mod adapter;
pub mod store;
pub mod transport;

pub use adapter::Adapter;
pub use store::TableStore;
pub use transport::ChatTransport;
