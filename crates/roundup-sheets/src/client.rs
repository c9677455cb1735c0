// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Google Sheets v4 and Drive v3 APIs.
//!
//! Provides [`SheetsClient`], the production [`TableStore`]: spreadsheet
//! creation with a seeded header row, sharing grants, row appends, and
//! full-range reads, with transient error retry.

use std::time::Duration;

use async_trait::async_trait;
use roundup_core::traits::adapter::Adapter;
use roundup_core::traits::store::TableStore;
use roundup_core::types::{AccessRole, AdapterType, HealthStatus, TableId};
use roundup_core::RoundupError;
use tracing::{debug, warn};

use crate::auth::{ServiceAccountKey, TokenProvider};
use crate::types::{
    ApiErrorResponse, AppendValuesRequest, CreateSpreadsheetRequest, CreateSpreadsheetResponse,
    PermissionRequest, ValueRange,
};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
const DRIVE_BASE_URL: &str = "https://www.googleapis.com";

/// Range covering the single sheet every spreadsheet is created with.
const SHEET_RANGE: &str = "Sheet1";

enum TokenSource {
    ServiceAccount(TokenProvider),
    #[cfg(test)]
    Static(String),
}

/// Google Sheets client implementing [`TableStore`].
///
/// Manages authentication, connection pooling, and retry logic for
/// transient errors (429, 500, 503).
pub struct SheetsClient {
    http: reqwest::Client,
    tokens: TokenSource,
    client_email: String,
    sheets_base: String,
    drive_base: String,
    max_retries: u32,
}

impl SheetsClient {
    /// Creates a client from a parsed service account key.
    pub fn new(key: &ServiceAccountKey) -> Result<Self, RoundupError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RoundupError::Storage {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let tokens = TokenSource::ServiceAccount(TokenProvider::new(http.clone(), key)?);

        Ok(Self {
            http,
            tokens,
            client_email: key.client_email.clone(),
            sheets_base: SHEETS_BASE_URL.to_string(),
            drive_base: DRIVE_BASE_URL.to_string(),
            max_retries: 1,
        })
    }

    /// Creates a client by loading the service account key file.
    pub fn from_key_file(path: &str) -> Result<Self, RoundupError> {
        Self::new(&ServiceAccountKey::from_file(path)?)
    }

    /// A client with a fixed bearer token and overridden base URLs
    /// (for testing with wiremock, bypassing the JWT flow).
    #[cfg(test)]
    fn with_static_token(token: &str, sheets_base: &str, drive_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            tokens: TokenSource::Static(token.to_string()),
            client_email: "svc@test.iam.gserviceaccount.com".to_string(),
            sheets_base: sheets_base.to_string(),
            drive_base: drive_base.to_string(),
            max_retries: 1,
        }
    }

    async fn token(&self) -> Result<String, RoundupError> {
        match &self.tokens {
            TokenSource::ServiceAccount(provider) => provider.access_token().await,
            #[cfg(test)]
            TokenSource::Static(token) => Ok(token.clone()),
        }
    }

    /// Sends one API request, retrying once on transient errors.
    ///
    /// Returns the parsed JSON body, or `Null` for an empty body.
    async fn execute(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, RoundupError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying sheets request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let token = self.token().await?;
            let mut request = self.http.request(method.clone(), url).bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|e| RoundupError::Storage {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(status = %status, attempt, "sheets response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| RoundupError::Storage {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                if text.is_empty() {
                    return Ok(serde_json::Value::Null);
                }
                return serde_json::from_str(&text).map_err(|e| {
                    RoundupError::storage(format!("unparseable API response: {e}"))
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(RoundupError::storage(format!(
                    "API returned {status}: {body}"
                )));
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "Google API error ({}): {}",
                    api_err.error.status, api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(RoundupError::storage(message));
        }

        Err(last_error
            .unwrap_or_else(|| RoundupError::storage("request failed after retries")))
    }
}

#[async_trait]
impl Adapter for SheetsClient {
    fn name(&self) -> &str {
        "google-sheets"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, RoundupError> {
        // A token mint exercises the key and the OAuth endpoint.
        match self.token().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "sheets auth unavailable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RoundupError> {
        debug!("sheets client shutting down");
        Ok(())
    }
}

#[async_trait]
impl TableStore for SheetsClient {
    async fn create_table(&self, title: &str, header: &[String]) -> Result<TableId, RoundupError> {
        let url = format!("{}/v4/spreadsheets?fields=spreadsheetId", self.sheets_base);
        let body = serde_json::to_value(CreateSpreadsheetRequest::with_header(title, header))
            .map_err(|e| RoundupError::Internal(format!("request serialization failed: {e}")))?;

        let response = self
            .execute(reqwest::Method::POST, &url, Some(&body))
            .await?;
        let created: CreateSpreadsheetResponse = serde_json::from_value(response)
            .map_err(|e| RoundupError::storage(format!("unexpected create response: {e}")))?;

        Ok(TableId(created.spreadsheet_id))
    }

    async fn grant_access(
        &self,
        table: &TableId,
        email: &str,
        role: AccessRole,
    ) -> Result<(), RoundupError> {
        let url = format!("{}/drive/v3/files/{}/permissions", self.drive_base, table);
        let body = serde_json::to_value(PermissionRequest {
            grantee_type: "user".to_string(),
            role: role.as_str().to_string(),
            email_address: email.to_string(),
        })
        .map_err(|e| RoundupError::Internal(format!("request serialization failed: {e}")))?;

        self.execute(reqwest::Method::POST, &url, Some(&body)).await?;
        Ok(())
    }

    async fn append_row(&self, table: &TableId, row: &[String]) -> Result<(), RoundupError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}!A1:append?valueInputOption=RAW",
            self.sheets_base, table, SHEET_RANGE
        );
        let body = serde_json::to_value(AppendValuesRequest {
            values: vec![row.to_vec()],
        })
        .map_err(|e| RoundupError::Internal(format!("request serialization failed: {e}")))?;

        self.execute(reqwest::Method::POST, &url, Some(&body)).await?;
        Ok(())
    }

    async fn read_all_rows(&self, table: &TableId) -> Result<Vec<Vec<String>>, RoundupError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.sheets_base, table, SHEET_RANGE
        );
        let response = self.execute(reqwest::Method::GET, &url, None).await?;
        let range: ValueRange = serde_json::from_value(response)
            .map_err(|e| RoundupError::storage(format!("unexpected values response: {e}")))?;
        Ok(range.values)
    }

    fn identity(&self) -> Option<String> {
        Some(self.client_email.clone())
    }

    fn share_url(&self, table: &TableId) -> Option<String> {
        Some(format!("https://docs.google.com/spreadsheets/d/{table}"))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth
/// retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
