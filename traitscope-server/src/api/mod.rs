// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! HTTP surface: shared state, the API error type and the router.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use traitscope_core::{ChartStyle, DisplayPolicy, SessionId, SessionIdError};
use traitscope_storage::{SessionRecord, SessionStore, StoreError};

use crate::analysis::{AnalysisClient, AnalysisError};

pub mod description;
pub mod graph;
pub mod health;
pub mod profile;

pub use description::get_description;
pub use graph::get_graph;
pub use health::health_check;
pub use profile::{delete_session, get_session, submit_profile};

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    #[error("Request timeout: {0}")]
    RequestTimeout(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            ApiError::RequestTimeout(msg) => (StatusCode::REQUEST_TIMEOUT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Timeout => ApiError::GatewayTimeout(err.to_string()),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Session store failure: {}", err);
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<SessionIdError> for ApiError {
    fn from(err: SessionIdError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Submission size limits
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub min_word_count: usize,
    pub max_text_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_word_count: 100,
            max_text_bytes: 1_000_000,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub analyzer: Arc<dyn AnalysisClient>,
    pub display: Arc<DisplayPolicy>,
    pub chart_style: Arc<ChartStyle>,
    /// Prefix for chart links, without a trailing slash
    pub base_url: Arc<str>,
    pub limits: Limits,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>, analyzer: Arc<dyn AnalysisClient>) -> Self {
        Self {
            store,
            analyzer,
            display: Arc::new(DisplayPolicy::default()),
            chart_style: Arc::new(ChartStyle::default()),
            base_url: Arc::from(""),
            limits: Limits::default(),
        }
    }

    pub fn with_display(mut self, display: DisplayPolicy) -> Self {
        self.display = Arc::new(display);
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Arc::from(base_url.trim_end_matches('/'));
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load the stored session or fail with a 404.
    pub(crate) fn load_session(&self, session_id: &SessionId) -> Result<SessionRecord, ApiError> {
        self.store.get(session_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("No profile stored for session {}", session_id))
        })
    }
}

/// Parse the `sessionId` query parameter, which every read route requires.
pub(crate) fn require_session_id(raw: Option<&str>) -> Result<SessionId, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::BadRequest("sessionId is required".to_string()))?;
    Ok(SessionId::parse(raw)?)
}

/// Build the application routes. Layers are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/profile", post(submit_profile))
        .route(
            "/api/v1/sessions/:session_id",
            get(get_session).delete(delete_session),
        )
        .route("/description", get(get_description))
        .route("/getGraph/:id", get(get_graph))
        .with_state(state)
}
