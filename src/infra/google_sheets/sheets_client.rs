use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::service_account::{AuthError, ServiceAccountAuth};

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Authorization failed: {0}")]
    Auth(#[from] AuthError),
    #[error("Google API error ({status}): {body}")]
    Api { status: StatusCode, body: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Minimal spreadsheet API surface. It deliberately exposes only the calls
/// the response store needs; ranges are in A1 notation against the first
/// worksheet.
#[async_trait]
pub trait SpreadsheetApi: Send + Sync {
    /// Resolves a spreadsheet ID by exact title, if one exists.
    async fn find_spreadsheet(&self, title: &str) -> Result<Option<String>, SheetsError>;

    /// Creates a new spreadsheet and returns its ID.
    async fn create_spreadsheet(&self, title: &str) -> Result<String, SheetsError>;

    /// Reads a range of cells, row-major. Trailing empty cells are absent.
    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Appends one row after the last data row of the range.
    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: &[String],
    ) -> Result<(), SheetsError>;

    /// Overwrites a range with the given rows.
    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetsError>;

    /// Clears every cell in the range.
    async fn clear_values(&self, spreadsheet_id: &str, range: &str) -> Result<(), SheetsError>;
}

// ---------------------------------------------------------------------------
// API response structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Drive search clause matching a non-trashed spreadsheet by exact title.
fn drive_title_query(title: &str) -> String {
    format!(
        "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
        title.replace('\\', "\\\\").replace('\'', "\\'")
    )
}

/// Sheets returns formatted cell values; anything non-string (a cell Google
/// decided is a number or bool) is rendered through its JSON form.
fn cell_to_string(value: &serde_json::Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// reqwest-backed client for the Sheets v4 and Drive v3 REST APIs.
pub struct GoogleSheetsClient {
    client: Client,
    auth: ServiceAccountAuth,
    sheets_base_url: String,
    drive_base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(auth: ServiceAccountAuth) -> Self {
        Self {
            client: Client::new(),
            auth,
            sheets_base_url: "https://sheets.googleapis.com/v4".to_string(),
            drive_base_url: "https://www.googleapis.com/drive/v3".to_string(),
        }
    }

    async fn bearer(&self) -> Result<String, SheetsError> {
        Ok(self.auth.get_access_token().await?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SheetsError::Api { status, body })
    }
}

#[async_trait]
impl SpreadsheetApi for GoogleSheetsClient {
    async fn find_spreadsheet(&self, title: &str) -> Result<Option<String>, SheetsError> {
        let token = self.bearer().await?;
        let url = format!("{}/files", self.drive_base_url);
        let query = drive_title_query(title);

        tracing::debug!("Looking up spreadsheet by title: {}", title);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name)"),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        let list: DriveFileList = Self::check(response).await?.json().await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<String, SheetsError> {
        let token = self.bearer().await?;
        let url = format!("{}/spreadsheets", self.sheets_base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "properties": { "title": title } }))
            .send()
            .await?;

        let created: CreatedSpreadsheet = Self::check(response).await?.json().await?;
        tracing::info!("Created spreadsheet \"{}\" ({})", title, created.spreadsheet_id);
        Ok(created.spreadsheet_id)
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let token = self.bearer().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.sheets_base_url, spreadsheet_id, range
        );

        let response = self.client.get(&url).bearer_auth(&token).send().await?;
        let value_range: ValueRange = Self::check(response).await?.json().await?;

        Ok(value_range
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: &[String],
    ) -> Result<(), SheetsError> {
        let token = self.bearer().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append",
            self.sheets_base_url, spreadsheet_id, range
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [row] }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetsError> {
        let token = self.bearer().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.sheets_base_url, spreadsheet_id, range
        );

        let response = self
            .client
            .put(&url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": values }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn clear_values(&self, spreadsheet_id: &str, range: &str) -> Result<(), SheetsError> {
        let token = self.bearer().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}:clear",
            self.sheets_base_url, spreadsheet_id, range
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({}))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
