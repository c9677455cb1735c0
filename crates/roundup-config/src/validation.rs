// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as a non-empty question catalog and a sane rotation
//! window.

use crate::diagnostic::ConfigError;
use crate::model::RoundupConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RoundupConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // The survey cannot run with an empty catalog.
    if config.survey.questions.is_empty() {
        errors.push(ConfigError::Validation {
            message: "survey.questions must contain at least one question".to_string(),
        });
    }

    for (i, q) in config.survey.questions.iter().enumerate() {
        if q.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("survey.questions[{i}] must not be blank"),
            });
        }
    }

    if config.survey.rotation_days == 0 {
        errors.push(ConfigError::Validation {
            message: "survey.rotation_days must be at least 1".to_string(),
        });
    }

    // The Telegram adapter is useless without someone to run it.
    if config.telegram.bot_token.is_some() {
        match &config.admin.main_admin {
            None => errors.push(ConfigError::Validation {
                message: "admin.main_admin is required when telegram.bot_token is set".to_string(),
            }),
            Some(id) if id.trim().is_empty() => errors.push(ConfigError::Validation {
                message: "admin.main_admin must not be empty".to_string(),
            }),
            Some(_) => {}
        }
    }

    if let Some(ref token) = config.telegram.bot_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "telegram.bot_token must not be empty when set".to_string(),
        });
    }

    if config.sheets.service_account_file.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "sheets.service_account_file must not be empty".to_string(),
        });
    }

    if let Some(ref email) = config.sheets.owner_email
        && !email.contains('@')
    {
        errors.push(ConfigError::Validation {
            message: format!("sheets.owner_email `{email}` is not a valid email address"),
        });
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = RoundupConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_questions_fails_validation() {
        let mut config = RoundupConfig::default();
        config.survey.questions.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("questions"))
        ));
    }

    #[test]
    fn zero_rotation_days_fails_validation() {
        let mut config = RoundupConfig::default();
        config.survey.rotation_days = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("rotation_days"))
        ));
    }

    #[test]
    fn bot_token_without_main_admin_fails_validation() {
        let mut config = RoundupConfig::default();
        config.telegram.bot_token = Some("123:ABC".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("main_admin"))
        ));
    }

    #[test]
    fn bot_token_with_main_admin_passes() {
        let mut config = RoundupConfig::default();
        config.telegram.bot_token = Some("123:ABC".to_string());
        config.admin.main_admin = Some("10001".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn bogus_owner_email_fails_validation() {
        let mut config = RoundupConfig::default();
        config.sheets.owner_email = Some("not-an-email".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("owner_email"))
        ));
    }
}
