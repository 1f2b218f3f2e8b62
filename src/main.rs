// This is the entry point of the poll server.
//
// **Architecture Overview:**
// - `core/` = Business logic (storage-agnostic)
// - `infra/` = Implementations of core traits (Google Sheets, OAuth)
// - `web/` = HTTP adapters (the poll page and its JSON API)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Start the web server

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with a handful of mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "web/web_layer.rs"]
mod web;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::core::poll::PollService;
use crate::infra::google_sheets::{
    GoogleSheetsClient, HeaderPolicy, ServiceAccountAuth, SheetResponseStore,
};

const DEFAULT_SPREADSHEET_TITLE: &str = "AI Tools Poll Results";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3030";
const DEFAULT_CACHE_TTL_SECS: u64 = 5;

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let spreadsheet_title = std::env::var("POLL_SPREADSHEET_TITLE")
        .unwrap_or_else(|_| DEFAULT_SPREADSHEET_TITLE.to_string());
    let bind_addr =
        std::env::var("POLL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let cache_ttl = std::env::var("POLL_CACHE_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_CACHE_TTL_SECS);
    // Destructive header reset stays off unless the operator opts in.
    let header_policy = if env_flag("POLL_ALLOW_HEADER_RESET") {
        HeaderPolicy::ResetSheet
    } else {
        HeaderPolicy::Reject
    };
    let create_if_missing = env_flag("POLL_CREATE_IF_MISSING");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies. Credential and spreadsheet
    // resolution failures stop the process here with a logged reason; they
    // are never surfaced to voters.

    let auth = ServiceAccountAuth::from_env()
        .await
        .context("Could not load Google service account credentials")?;
    tracing::info!("Authorized as {}", auth.client_email());

    let sheets = GoogleSheetsClient::new(auth);
    let store =
        SheetResponseStore::open(sheets, &spreadsheet_title, header_policy, create_if_missing)
            .await
            .with_context(|| format!("Could not open spreadsheet \"{}\"", spreadsheet_title))?;
    tracing::info!("Using spreadsheet \"{}\"", spreadsheet_title);

    let poll = Arc::new(PollService::new(store, Duration::from_secs(cache_ttl)));

    // ========================================================================
    // WEB SERVER
    // ========================================================================

    web::routes::run(poll, &bind_addr).await
}
