// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the roundup configuration system.

use roundup_config::diagnostic::{ConfigError, suggest_key};
use roundup_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_roundup_config() {
    let toml = r#"
[agent]
name = "weekly-roundup"
log_level = "debug"

[telegram]
bot_token = "123:ABC"
allowed_users = ["alice", "bob"]

[sheets]
service_account_file = "/etc/roundup/credentials.json"
owner_email = "lead@example.com"

[survey]
questions = ["1) How was your week?", "2) Blockers?"]
rotation_days = 14

[admin]
main_admin = "10001"
admins = ["10002", "10003"]

[gateway]
host = "0.0.0.0"
port = 9090
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "weekly-roundup");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.allowed_users, vec!["alice", "bob"]);
    assert_eq!(
        config.sheets.service_account_file,
        "/etc/roundup/credentials.json"
    );
    assert_eq!(config.sheets.owner_email.as_deref(), Some("lead@example.com"));
    assert_eq!(config.survey.questions.len(), 2);
    assert_eq!(config.survey.rotation_days, 14);
    assert_eq!(config.admin.main_admin.as_deref(), Some("10001"));
    assert_eq!(config.admin.admins, vec!["10002", "10003"]);
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 9090);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "roundup");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.allowed_users.is_empty());
    assert_eq!(config.sheets.service_account_file, "credentials.json");
    assert_eq!(config.survey.questions.len(), 4);
    assert!(config.survey.questions[0].contains("Brief summary"));
    assert_eq!(config.survey.rotation_days, 7);
    assert!(config.admin.main_admin.is_none());
    assert_eq!(config.gateway.port, 8088);
}

/// Unknown field in [telegram] section produces an error.
#[test]
fn unknown_field_in_telegram_produces_error() {
    let toml = r#"
[telegram]
bot_tken = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("bot_tken"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unknown fields surface with a fuzzy-match suggestion through the
/// high-level entry point.
#[test]
fn typo_in_survey_section_suggests_correction() {
    let toml = r#"
[survey]
rotaton_days = 7
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject typo");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion, .. }
            if key == "rotaton_days" && suggestion.as_deref() == Some("rotation_days")
    )));
}

/// Wrong value type produces an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type_error() {
    let toml = r#"
[survey]
rotation_days = "soon"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_))),
        "expected a type error, got: {errors:?}"
    );
}

/// Validation failures from the high-level entry point are reported.
#[test]
fn validation_errors_are_reported() {
    let toml = r#"
[survey]
questions = []
"#;

    let errors = load_and_validate_str(toml).expect_err("empty catalog should fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("questions"))
    ));
}

/// A serve-ready config passes validation end to end.
#[test]
fn serve_ready_config_validates() {
    let toml = r#"
[telegram]
bot_token = "123:ABC"

[admin]
main_admin = "10001"
"#;

    let config = load_and_validate_str(toml).expect("serve-ready config should validate");
    assert_eq!(config.admin.main_admin.as_deref(), Some("10001"));
}

/// The suggestion helper is conservative about distant strings.
#[test]
fn suggest_key_threshold() {
    assert_eq!(
        suggest_key("owner_emial", &["service_account_file", "owner_email"]),
        Some("owner_email".to_string())
    );
    assert_eq!(suggest_key("xyz", &["service_account_file", "owner_email"]), None);
}
