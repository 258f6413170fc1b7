pub mod config;
pub mod error;
pub mod github;
pub mod markdown;
pub mod metrics;
pub mod normalize;
pub mod pagination;
pub mod querier;
pub mod query;
pub mod telemetry;
pub mod types;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use config::AppConfig;
use error::ContributionError;
use github::GitHubClient;
use querier::ContributionQuerier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use telemetry::TracingObserver;
use tower_http::trace::TraceLayer;
use types::{ContributionReport, DateRange};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Shared application state accessible to all request handlers.
pub struct AppState {
    /// Service that assembles contribution reports.
    pub querier: ContributionQuerier,
    /// Application configuration loaded from environment variables.
    pub config: AppConfig,
}

impl AppState {
    /// Initializes the application state with a GitHub-backed querier.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let client = GitHubClient::new(&config)?;
        let querier = ContributionQuerier::new(
            Arc::new(client),
            Arc::new(TracingObserver),
            config.max_comment_pages,
        );
        Ok(Self { querier, config })
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/fetch-contributions", post(fetch_contributions))
        .route("/api/contributions/markdown", post(contributions_markdown))
        .route("/api/download-markdown", post(download_markdown))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<MessageResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(MessageResponse {
            message: message.into(),
        }),
    )
}

/// Body of the report endpoints. Fields are optional so a missing one yields a 400
/// instead of the extractor's rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsRequest {
    pub username: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    pub username: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub message: String,
    pub filename: String,
}

fn required(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_request(request: ContributionsRequest) -> Result<(String, DateRange), ApiError> {
    let (Some(username), Some(start), Some(end)) = (
        required(request.username),
        required(request.start_date),
        required(request.end_date),
    ) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing required fields"));
    };

    let parse = |value: &str| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid date {value:?}, expected YYYY-MM-DD"),
            )
        })
    };

    Ok((username, DateRange::new(parse(&start)?, parse(&end)?)))
}

/// Maps an aggregation failure to a status code and message.
fn contribution_error_response(error: &ContributionError) -> ApiError {
    match error {
        ContributionError::SearchFailed {
            status, message, ..
        } => {
            if matches!(status, Some(403 | 429)) && message.to_lowercase().contains("rate limit") {
                return api_error(StatusCode::TOO_MANY_REQUESTS, message.clone());
            }
            if *status == Some(422) {
                return api_error(StatusCode::UNPROCESSABLE_ENTITY, message.clone());
            }
            api_error(StatusCode::INTERNAL_SERVER_ERROR, message.clone())
        }
        _ => api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
    }
}

async fn build_report(
    state: &AppState,
    request: ContributionsRequest,
) -> Result<(String, DateRange, ContributionReport), ApiError> {
    let (username, range) = parse_request(request)?;

    match state.querier.fetch_contributions(&username, range).await {
        Ok(report) => Ok((username, range, report)),
        Err(e) => {
            tracing::error!("Failed to fetch contributions for {}: {}", username, e);
            Err(contribution_error_response(&e))
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "contrib-report",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn fetch_contributions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContributionsRequest>,
) -> Result<Json<ContributionReport>, ApiError> {
    let (username, _, report) = build_report(&state, request).await?;
    tracing::debug!(username = %username, "Returning contributions");
    Ok(Json(report))
}

pub async fn contributions_markdown(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContributionsRequest>,
) -> Result<Response, ApiError> {
    let (username, range, report) = build_report(&state, request).await?;
    let body = markdown::render_report(&username, &range, &report);
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        body,
    )
        .into_response())
}

pub async fn download_markdown(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let (Some(username), Some(content)) = (required(request.username), request.content) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing username or content",
        ));
    };
    if content.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing username or content",
        ));
    }
    if !markdown::is_safe_file_stem(&username) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid username"));
    }

    match markdown::append_report(&state.config.downloads_dir, &username, &content).await {
        Ok(filename) => Ok(Json(DownloadResponse {
            message: "Markdown saved successfully".to_string(),
            filename,
        })),
        Err(e) => {
            tracing::error!("Failed to save markdown for {}: {}", username, e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save markdown file",
            ))
        }
    }
}
