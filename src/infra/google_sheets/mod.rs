// =============================================================================
// GOOGLE SHEETS MODULE
// =============================================================================
//
// Integration with Google Sheets, the system of record for poll responses.
// This module lives in the infra layer because it handles external I/O
// (HTTP requests to Google APIs). The core layer only knows about
// "responses" - it doesn't care where they are stored.
//
// - `service_account.rs` exchanges the service-account key for bearer tokens.
// - `sheets_client.rs` talks to the Sheets v4 and Drive v3 HTTP APIs.
// - `sheet_store.rs` implements the core `ResponseStore` on top of a sheet.

pub mod service_account;
pub mod sheet_store;
pub mod sheets_client;

pub use service_account::{AuthError, ServiceAccountAuth};
pub use sheet_store::{HeaderPolicy, SheetResponseStore, EXPECTED_HEADER};
pub use sheets_client::{GoogleSheetsClient, SheetsError, SpreadsheetApi};
