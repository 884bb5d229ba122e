use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::TranscriptError;
use crate::fetcher::TranscriptFetcher;
use crate::{Segment, extract_video_id};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    fetcher: Arc<TranscriptFetcher>,
    default_languages: Arc<[String]>,
}

impl AppState {
    pub fn new(fetcher: TranscriptFetcher, default_languages: Vec<String>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            default_languages: default_languages.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    pub url: Option<String>,
    /// Overrides the server's default language preferences for this request
    pub languages: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub success: bool,
    pub video_id: String,
    pub title: String,
    pub language_code: String,
    pub is_generated: bool,
    pub transcript_text: String,
    pub raw_transcript: Vec<Segment>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub kind: &'static str,
}

/// HTTP face of a [`TranscriptError`]
#[derive(Debug)]
pub struct ApiError(pub TranscriptError);

impl From<TranscriptError> for ApiError {
    fn from(err: TranscriptError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err {
            TranscriptError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TranscriptError::CaptionsDisabled(_)
            | TranscriptError::VideoUnavailable { .. }
            | TranscriptError::NoTrackFound { .. } => StatusCode::NOT_FOUND,
            TranscriptError::Transient(_) => StatusCode::BAD_GATEWAY,
            TranscriptError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &err {
            TranscriptError::Internal(detail) => {
                error!("Internal error: {detail}");
                "internal server error".to_string()
            }
            TranscriptError::Transient(detail) => {
                warn!("Captions provider failure: {detail}");
                err.to_string()
            }
            _ => err.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: message,
                kind: err.kind(),
            }),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/transcript", post(transcript))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "YouTube Transcript API is running",
        "endpoints": {
            "/transcript": "POST - Get YouTube transcript",
            "/health": "GET - Health check"
        }
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn transcript(
    State(state): State<AppState>,
    payload: Result<Json<TranscriptRequest>, JsonRejection>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        TranscriptError::InvalidInput(format!("request body must be a JSON object: {}", rejection.body_text()))
    })?;

    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| TranscriptError::InvalidInput("URL is required".to_string()))?;

    let video_id = extract_video_id(url).ok_or_else(|| TranscriptError::InvalidInput(url.to_string()))?;

    let languages = match request.languages {
        Some(languages) => languages,
        None => state.default_languages.to_vec(),
    };

    info!("Transcript requested for {video_id} (languages: [{}])", languages.join(", "));

    let transcript = state.fetcher.fetch(&video_id, &languages).await?;
    let transcript_text = transcript.full_text();

    Ok(Json(TranscriptResponse {
        success: true,
        video_id: transcript.video_id,
        title: transcript.title,
        language_code: transcript.language,
        is_generated: transcript.is_generated,
        transcript_text,
        count: transcript.segments.len(),
        raw_transcript: transcript.segments,
    }))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError(TranscriptError::Internal(detail)).into_response()
}
