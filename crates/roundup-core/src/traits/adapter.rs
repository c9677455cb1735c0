// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by the transport and storage integrations.

use async_trait::async_trait;

use crate::error::RoundupError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for roundup's external-service adapters.
///
/// Both the chat transport and the table store implement this, providing
/// identity, lifecycle, and health check capabilities to the binary.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the type of adapter (channel or store).
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, RoundupError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), RoundupError>;
}
