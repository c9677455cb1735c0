// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./roundup.toml` > `~/.config/roundup/roundup.toml`
//! > `/etc/roundup/roundup.toml` with environment variable overrides via the
//! `ROUNDUP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RoundupConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/roundup/roundup.toml` (system-wide)
/// 3. `~/.config/roundup/roundup.toml` (user XDG config)
/// 4. `./roundup.toml` (local directory)
/// 5. `ROUNDUP_*` environment variables
pub fn load_config() -> Result<RoundupConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RoundupConfig::default()))
        .merge(Toml::file("/etc/roundup/roundup.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("roundup/roundup.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("roundup.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RoundupConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RoundupConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RoundupConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RoundupConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `ROUNDUP_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("ROUNDUP_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: ROUNDUP_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("sheets_", "sheets.", 1)
            .replacen("survey_", "survey.", 1)
            .replacen("admin_", "admin.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
