use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::core::poll::{tally_votes, PollError, PollResponse, PollService, VoteCount, POLL_OPTIONS};
use crate::infra::google_sheets::{GoogleSheetsClient, SheetResponseStore};

/// Concrete service type shared by every handler.
pub type Poll = PollService<SheetResponseStore<GoogleSheetsClient>>;

const PAGE_TITLE: &str = "🚀 AI Tools Poll";
const PROMPT: &str = "We are gathering your feedback on the best AI tools to improve \
                      efficiency, speed, and accuracy. Please vote and share your suggestions!";
const QUESTION: &str = "Which AI Tool Do You Recommend?";
const COMMENTS_LABEL: &str = "Additional Suggestions (Optional)";
const FOOTER: &str = "Results update automatically every 5 seconds. No need to refresh the page!";
const SUCCESS_MESSAGE: &str = "Thank you! Your response has been recorded!";
const UNAVAILABLE_MESSAGE: &str = "The poll is temporarily unavailable. Please try again in a moment.";
const SAVE_FAILED_MESSAGE: &str = "Error saving your response. Please try again in a moment.";

/// Everything the page needs for one render: static copy, the option list,
/// all responses and the derived tally.
#[derive(Serialize)]
struct PollView {
    title: &'static str,
    prompt: &'static str,
    question: &'static str,
    comments_label: &'static str,
    footer: &'static str,
    options: Vec<&'static str>,
    responses: Vec<PollResponse>,
    tally: Vec<VoteCount>,
}

#[derive(Deserialize)]
struct VoteRequest {
    name: String,
    selected_option: String,
    #[serde(default)]
    comments: String,
}

#[derive(Serialize)]
struct VoteReply {
    status: &'static str,
    message: String,
}

fn unavailable(err: PollError) -> (StatusCode, Json<VoteReply>) {
    // Backend details stay in the log; voters get a generic message.
    tracing::error!("Failed to load poll results: {}", err);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(VoteReply {
            status: "error",
            message: UNAVAILABLE_MESSAGE.to_string(),
        }),
    )
}

async fn get_poll(
    State(poll): State<Arc<Poll>>,
) -> Result<Json<PollView>, (StatusCode, Json<VoteReply>)> {
    let responses = poll.fetch_all_responses().await.map_err(unavailable)?;
    let tally = tally_votes(&responses);

    Ok(Json(PollView {
        title: PAGE_TITLE,
        prompt: PROMPT,
        question: QUESTION,
        comments_label: COMMENTS_LABEL,
        footer: FOOTER,
        options: POLL_OPTIONS.to_vec(),
        responses,
        tally,
    }))
}

async fn submit_vote(
    State(poll): State<Arc<Poll>>,
    Json(vote): Json<VoteRequest>,
) -> (StatusCode, Json<VoteReply>) {
    match poll
        .submit_response(&vote.name, &vote.selected_option, &vote.comments)
        .await
    {
        Ok(response) => {
            tracing::info!(
                "Recorded response from \"{}\" for \"{}\"",
                response.name,
                response.selected_option
            );
            (
                StatusCode::CREATED,
                Json(VoteReply {
                    status: "success",
                    message: SUCCESS_MESSAGE.to_string(),
                }),
            )
        }
        Err(err @ PollError::MissingField) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(VoteReply {
                status: "warning",
                message: err.to_string(),
            }),
        ),
        Err(err @ PollError::DuplicateName(_)) => (
            StatusCode::CONFLICT,
            Json(VoteReply {
                status: "error",
                message: err.to_string(),
            }),
        ),
        Err(PollError::Store(err)) => {
            tracing::error!("Failed to record response: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(VoteReply {
                    status: "error",
                    message: SAVE_FAILED_MESSAGE.to_string(),
                }),
            )
        }
    }
}

/// Serves the JSON API under `/api` and the static poll page from `assets/`.
pub async fn run(poll: Arc<Poll>, bind_addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    let api = Router::new()
        .route("/poll", get(get_poll))
        .route("/vote", post(submit_vote))
        .with_state(poll);

    let app = Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new("assets"));

    tracing::info!("Poll page available at http://{}", bind_addr);

    axum::serve(listener, app)
        .await
        .context("Web server failed")
}
