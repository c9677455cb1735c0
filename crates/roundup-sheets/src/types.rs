// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response types for the Sheets v4, Drive v3, and OAuth APIs.

use serde::{Deserialize, Serialize};

/// `POST /v4/spreadsheets` request body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSpreadsheetRequest {
    pub properties: SpreadsheetProperties,
    pub sheets: Vec<SheetData>,
}

impl CreateSpreadsheetRequest {
    /// A single-sheet spreadsheet seeded with one header row.
    pub fn with_header(title: &str, header: &[String]) -> Self {
        Self {
            properties: SpreadsheetProperties {
                title: title.to_string(),
            },
            sheets: vec![SheetData {
                data: vec![GridData {
                    start_row: 0,
                    start_column: 0,
                    row_data: vec![RowData {
                        values: header
                            .iter()
                            .map(|h| CellData {
                                user_entered_value: ExtendedValue {
                                    string_value: h.clone(),
                                },
                            })
                            .collect(),
                    }],
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpreadsheetProperties {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetData {
    pub data: Vec<GridData>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    pub start_row: u32,
    pub start_column: u32,
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowData {
    pub values: Vec<CellData>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub user_entered_value: ExtendedValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    pub string_value: String,
}

/// `POST /v4/spreadsheets` response (restricted via `fields=spreadsheetId`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpreadsheetResponse {
    pub spreadsheet_id: String,
}

/// Body for `values/...:append`.
#[derive(Debug, Clone, Serialize)]
pub struct AppendValuesRequest {
    pub values: Vec<Vec<String>>,
}

/// Response of `GET values/{range}`. The `values` field is absent for an
/// entirely empty range.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// `POST /drive/v3/files/{id}/permissions` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    #[serde(rename = "type")]
    pub grantee_type: String,
    pub role: String,
    pub email_address: String,
}

/// OAuth token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// Error envelope returned by the Google APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_serializes_header_cells() {
        let req = CreateSpreadsheetRequest::with_header(
            "Week 1 Responses",
            &["User ID".to_string(), "Name".to_string()],
        );
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["properties"]["title"], "Week 1 Responses");
        let cells = &json["sheets"][0]["data"][0]["rowData"][0]["values"];
        assert_eq!(cells[0]["userEnteredValue"]["stringValue"], "User ID");
        assert_eq!(cells[1]["userEnteredValue"]["stringValue"], "Name");
        assert_eq!(json["sheets"][0]["data"][0]["startRow"], 0);
    }

    #[test]
    fn value_range_defaults_to_empty() {
        let range: ValueRange = serde_json::from_str("{}").unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn permission_request_uses_wire_field_names() {
        let req = PermissionRequest {
            grantee_type: "user".into(),
            role: "writer".into(),
            email_address: "owner@example.com".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "user");
        assert_eq!(json["role"], "writer");
        assert_eq!(json["emailAddress"], "owner@example.com");
    }

    #[test]
    fn api_error_parses_google_envelope() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.code, 403);
        assert_eq!(parsed.error.status, "PERMISSION_DENIED");
    }
}
