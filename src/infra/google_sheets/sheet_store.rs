use async_trait::async_trait;

use crate::core::poll::{PollResponse, ResponseStore, StoreError};

use super::sheets_client::{SheetsError, SpreadsheetApi};

/// Column layout of the results sheet. Row 1 must match this exactly.
pub const EXPECTED_HEADER: [&str; 4] = ["Name", "Selected Option", "Comments", "Timestamp"];

/// The whole data region of the first worksheet.
const DATA_RANGE: &str = "A:D";
const HEADER_RANGE: &str = "A1:D1";
/// Used when resetting; wide enough to catch stray columns beyond D.
const CLEAR_RANGE: &str = "A:Z";

/// What to do when row 1 does not match `EXPECTED_HEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Fail the read and leave the sheet untouched (default).
    Reject,
    /// Clear the sheet and rewrite the header. Destroys every stored
    /// response, so it only runs behind an explicit operator opt-in.
    ResetSheet,
}

/// `ResponseStore` implementation over one worksheet. Resolves the
/// spreadsheet by exact title once at startup and reconciles the header row
/// on every read.
pub struct SheetResponseStore<C: SpreadsheetApi> {
    api: C,
    spreadsheet_id: String,
    header_policy: HeaderPolicy,
}

impl<C: SpreadsheetApi> SheetResponseStore<C> {
    /// Opens the results spreadsheet. A missing spreadsheet is an error
    /// unless `create_if_missing` is set, in which case it is created with
    /// the expected header row.
    pub async fn open(
        api: C,
        title: &str,
        header_policy: HeaderPolicy,
        create_if_missing: bool,
    ) -> Result<Self, StoreError> {
        let spreadsheet_id = match api.find_spreadsheet(title).await.map_err(store_err)? {
            Some(id) => id,
            None if create_if_missing => {
                tracing::info!("Spreadsheet \"{}\" not found, creating it", title);
                let id = api.create_spreadsheet(title).await.map_err(store_err)?;
                api.update_values(&id, HEADER_RANGE, vec![header_row()])
                    .await
                    .map_err(store_err)?;
                id
            }
            None => return Err(StoreError::NotFound(title.to_string())),
        };

        Ok(Self {
            api,
            spreadsheet_id,
            header_policy,
        })
    }

    async fn reset_sheet(&self, discarded_rows: usize) -> Result<(), StoreError> {
        tracing::warn!(
            discarded_rows,
            "Header row does not match the expected layout; clearing the sheet \
             and rewriting the header. All stored responses are discarded."
        );
        self.api
            .clear_values(&self.spreadsheet_id, CLEAR_RANGE)
            .await
            .map_err(store_err)?;
        self.api
            .update_values(&self.spreadsheet_id, HEADER_RANGE, vec![header_row()])
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

fn store_err(err: SheetsError) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn header_row() -> Vec<String> {
    EXPECTED_HEADER.iter().map(|s| s.to_string()).collect()
}

fn header_matches(row: &[String]) -> bool {
    row.len() == EXPECTED_HEADER.len()
        && row
            .iter()
            .zip(EXPECTED_HEADER)
            .all(|(cell, expected)| cell == expected)
}

/// Maps data rows to responses, padding short rows with empty cells (Sheets
/// drops trailing empty cells from its response).
fn rows_to_responses(rows: &[Vec<String>]) -> Vec<PollResponse> {
    rows.iter()
        .map(|row| {
            let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
            PollResponse {
                name: cell(0),
                selected_option: cell(1),
                comments: cell(2),
                timestamp: cell(3),
            }
        })
        .collect()
}

#[async_trait]
impl<C: SpreadsheetApi> ResponseStore for SheetResponseStore<C> {
    async fn read_all(&self) -> Result<Vec<PollResponse>, StoreError> {
        let values = self
            .api
            .get_values(&self.spreadsheet_id, DATA_RANGE)
            .await
            .map_err(store_err)?;

        match values.first() {
            None => {
                // Brand-new worksheet: write the header so appends line up.
                self.api
                    .update_values(&self.spreadsheet_id, HEADER_RANGE, vec![header_row()])
                    .await
                    .map_err(store_err)?;
                Ok(Vec::new())
            }
            Some(first) if !header_matches(first) => match self.header_policy {
                HeaderPolicy::Reject => Err(StoreError::Schema(format!(
                    "expected header {:?}, found {:?} \
                     (set POLL_ALLOW_HEADER_RESET=true to clear and rewrite the sheet)",
                    EXPECTED_HEADER, first
                ))),
                HeaderPolicy::ResetSheet => {
                    self.reset_sheet(values.len()).await?;
                    Ok(Vec::new())
                }
            },
            Some(_) => Ok(rows_to_responses(&values[1..])),
        }
    }

    async fn append(&self, response: &PollResponse) -> Result<(), StoreError> {
        let row = vec![
            response.name.clone(),
            response.selected_option.clone(),
            response.comments.clone(),
            response.timestamp.clone(),
        ];
        self.api
            .append_row(&self.spreadsheet_id, DATA_RANGE, &row)
            .await
            .map_err(store_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    // In-memory worksheet. Ranges are interpreted just enough for the store:
    // updates starting at row 1 overwrite from the top, clears empty the
    // whole grid, appends go after the last row.
    struct FakeSheets {
        exists: AtomicBool,
        rows: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl FakeSheets {
        fn new(exists: bool) -> (Self, Arc<Mutex<Vec<Vec<String>>>>) {
            let rows = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    exists: AtomicBool::new(exists),
                    rows: Arc::clone(&rows),
                },
                rows,
            )
        }

        fn seeded(rows_in: Vec<Vec<&str>>) -> (Self, Arc<Mutex<Vec<Vec<String>>>>) {
            let (fake, rows) = Self::new(true);
            *rows.lock().unwrap() = rows_in
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect();
            (fake, rows)
        }
    }

    #[async_trait]
    impl SpreadsheetApi for FakeSheets {
        async fn find_spreadsheet(&self, _title: &str) -> Result<Option<String>, SheetsError> {
            Ok(self
                .exists
                .load(Ordering::SeqCst)
                .then(|| "sheet-1".to_string()))
        }

        async fn create_spreadsheet(&self, _title: &str) -> Result<String, SheetsError> {
            self.exists.store(true, Ordering::SeqCst);
            Ok("sheet-1".to_string())
        }

        async fn get_values(
            &self,
            _spreadsheet_id: &str,
            _range: &str,
        ) -> Result<Vec<Vec<String>>, SheetsError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn append_row(
            &self,
            _spreadsheet_id: &str,
            _range: &str,
            row: &[String],
        ) -> Result<(), SheetsError> {
            self.rows.lock().unwrap().push(row.to_vec());
            Ok(())
        }

        async fn update_values(
            &self,
            _spreadsheet_id: &str,
            _range: &str,
            values: Vec<Vec<String>>,
        ) -> Result<(), SheetsError> {
            let mut rows = self.rows.lock().unwrap();
            for (i, row) in values.into_iter().enumerate() {
                if i < rows.len() {
                    rows[i] = row;
                } else {
                    rows.push(row);
                }
            }
            Ok(())
        }

        async fn clear_values(
            &self,
            _spreadsheet_id: &str,
            _range: &str,
        ) -> Result<(), SheetsError> {
            self.rows.lock().unwrap().clear();
            Ok(())
        }
    }

    fn header() -> Vec<&'static str> {
        vec!["Name", "Selected Option", "Comments", "Timestamp"]
    }

    #[tokio::test]
    async fn open_fails_when_spreadsheet_is_missing() {
        let (fake, _) = FakeSheets::new(false);

        let result =
            SheetResponseStore::open(fake, "AI Tools Poll Results", HeaderPolicy::Reject, false)
                .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn open_creates_sheet_with_header_when_allowed() {
        let (fake, rows) = FakeSheets::new(false);

        SheetResponseStore::open(fake, "AI Tools Poll Results", HeaderPolicy::Reject, true)
            .await
            .unwrap();

        assert_eq!(*rows.lock().unwrap(), vec![header_row()]);
    }

    #[tokio::test]
    async fn read_on_empty_sheet_writes_header() {
        let (fake, rows) = FakeSheets::new(true);
        let store =
            SheetResponseStore::open(fake, "AI Tools Poll Results", HeaderPolicy::Reject, false)
                .await
                .unwrap();

        let responses = store.read_all().await.unwrap();

        assert!(responses.is_empty());
        assert_eq!(*rows.lock().unwrap(), vec![header_row()]);
    }

    #[tokio::test]
    async fn read_maps_rows_in_sheet_order() {
        let (fake, _) = FakeSheets::seeded(vec![
            header(),
            vec!["Alice", "Claude", "great", "2025-01-01 12:00:00"],
            vec!["Bob", "Replit"],
        ]);
        let store =
            SheetResponseStore::open(fake, "AI Tools Poll Results", HeaderPolicy::Reject, false)
                .await
                .unwrap();

        let responses = store.read_all().await.unwrap();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].name, "Alice");
        assert_eq!(responses[0].timestamp, "2025-01-01 12:00:00");
        // Short rows come back padded with empty cells.
        assert_eq!(responses[1].name, "Bob");
        assert_eq!(responses[1].comments, "");
        assert_eq!(responses[1].timestamp, "");
    }

    #[tokio::test]
    async fn mismatched_header_is_rejected_by_default() {
        let (fake, rows) = FakeSheets::seeded(vec![
            vec!["Name", "Selected Option", "Comments"],
            vec!["Alice", "Claude", "old row"],
        ]);
        let store =
            SheetResponseStore::open(fake, "AI Tools Poll Results", HeaderPolicy::Reject, false)
                .await
                .unwrap();

        let result = store.read_all().await;

        assert!(matches!(result, Err(StoreError::Schema(_))));
        // The sheet is left untouched.
        assert_eq!(rows.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mismatched_header_reset_discards_all_rows() {
        // Destructive by design: resetting the header wipes every stored
        // response, not just the bad header row.
        let (fake, rows) = FakeSheets::seeded(vec![
            vec!["Name", "Selected Option", "Comments"],
            vec!["Alice", "Claude", "old row"],
            vec!["Bob", "Replit", "another"],
        ]);
        let store = SheetResponseStore::open(
            fake,
            "AI Tools Poll Results",
            HeaderPolicy::ResetSheet,
            false,
        )
        .await
        .unwrap();

        let responses = store.read_all().await.unwrap();

        assert!(responses.is_empty());
        assert_eq!(*rows.lock().unwrap(), vec![header_row()]);
    }

    #[tokio::test]
    async fn append_adds_row_after_existing_data() {
        let (fake, rows) = FakeSheets::seeded(vec![
            header(),
            vec!["Alice", "Claude", "", "2025-01-01 12:00:00"],
        ]);
        let store =
            SheetResponseStore::open(fake, "AI Tools Poll Results", HeaderPolicy::Reject, false)
                .await
                .unwrap();

        store
            .append(&PollResponse {
                name: "Bob".to_string(),
                selected_option: "Replit".to_string(),
                comments: String::new(),
                timestamp: "2025-01-01 12:00:05".to_string(),
            })
            .await
            .unwrap();

        let rows = rows.lock().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0], "Bob");
    }
}
