// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the roundup survey bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level roundup configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values; the
/// serve path additionally requires `telegram.bot_token` and
/// `admin.main_admin` (enforced by validation, not deserialization, so that
/// offline commands still work without credentials).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoundupConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Google Sheets storage settings.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Survey content and rotation settings.
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Operator roster settings.
    #[serde(default)]
    pub admin: AdminConfig,

    /// Health endpoint settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "roundup".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the Telegram adapter.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// List of allowed Telegram user IDs or usernames.
    ///
    /// Empty means every user may fill the survey; privileged commands are
    /// gated by the admin roster regardless of this list.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

/// Google Sheets storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsConfig {
    /// Path to the service account JSON key file.
    #[serde(default = "default_service_account_file")]
    pub service_account_file: String,

    /// Personal email each new spreadsheet is shared with.
    #[serde(default)]
    pub owner_email: Option<String>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            service_account_file: default_service_account_file(),
            owner_email: None,
        }
    }
}

fn default_service_account_file() -> String {
    "credentials.json".to_string()
}

/// Survey content and rotation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyConfig {
    /// Ordered list of survey questions, 1-indexed for display.
    #[serde(default = "default_questions")]
    pub questions: Vec<String>,

    /// Days after which the active week is considered stale. Rolling, not
    /// calendar-aligned: the clock starts when the week's sheet is created.
    #[serde(default = "default_rotation_days")]
    pub rotation_days: u64,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            questions: default_questions(),
            rotation_days: default_rotation_days(),
        }
    }
}

fn default_questions() -> Vec<String> {
    vec![
        "1) Brief summary of your week:".to_string(),
        "2) New projects you are working on:".to_string(),
        "3) Points of attention for the team:".to_string(),
        "4) Any other activities you want to mention:".to_string(),
    ]
}

fn default_rotation_days() -> u64 {
    7
}

/// Operator roster configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// The single main admin user id. Only this identity may manage the
    /// roster and edit the question catalog.
    #[serde(default)]
    pub main_admin: Option<String>,

    /// Initial list of sub-admin user ids.
    #[serde(default)]
    pub admins: Vec<String>,
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind the health endpoint to.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind the health endpoint to.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8088
}
