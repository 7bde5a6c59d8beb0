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

//! Profile submission and stored-session endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use traitscope_core::{flatten, DisplayItem, FlattenContext, SessionId};
use traitscope_storage::SessionRecord;
use tracing::{debug, info};

use crate::api::{ApiError, AppState};

/// Request body for POST /api/v1/profile
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProfileRequest {
    /// Omitted on first submission; the server assigns one
    #[serde(default)]
    pub session_id: Option<String>,
    pub text: String,
}

/// Response for POST /api/v1/profile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProfileResponse {
    pub session_id: SessionId,
    pub created: DateTime<Utc>,
    pub word_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count_message: Option<String>,
    pub description: Vec<DisplayItem>,
}

/// Response for GET /api/v1/sessions/:session_id
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub content: String,
    pub created: DateTime<Utc>,
}

/// POST /api/v1/profile - Analyze text and store the profile for a session
#[tracing::instrument(skip(state, payload), fields(session_id = tracing::field::Empty))]
pub async fn submit_profile(
    State(state): State<AppState>,
    payload: Result<Json<SubmitProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitProfileResponse>), ApiError> {
    let Json(request) = payload?;

    let session_id = match request.session_id.as_deref() {
        Some(raw) => SessionId::parse(raw)?,
        None => SessionId::generate(),
    };
    tracing::Span::current().record("session_id", session_id.as_str());

    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }
    if text.len() > state.limits.max_text_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "text is {} bytes; the limit is {}",
            text.len(),
            state.limits.max_text_bytes
        )));
    }
    let words = text.split_whitespace().count();
    if words < state.limits.min_word_count {
        return Err(ApiError::BadRequest(format!(
            "text has {} words; at least {} are required",
            words, state.limits.min_word_count
        )));
    }

    debug!(words, analyzer = state.analyzer.name(), "Submitting text for analysis");
    let document = state.analyzer.analyze(text).await?;

    let record = SessionRecord::new(session_id.clone(), text.to_string(), document);
    let ctx = FlattenContext::new(&state.display, &state.base_url, session_id.as_str());
    let description = flatten(record.response.top_level(), &ctx);
    let response = SubmitProfileResponse {
        session_id: session_id.clone(),
        created: record.created,
        word_count: record.response.word_count.unwrap_or(words as u64),
        word_count_message: record.response.word_count_message.clone(),
        description,
    };

    state.store.put(record)?;
    info!(items = response.description.len(), "Stored profile");

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/sessions/:session_id - Return the last submitted text
#[tracing::instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Path(session_id) = path?;
    let session_id = SessionId::parse(&session_id)?;
    let record = state.load_session(&session_id)?;

    Ok(Json(SessionResponse {
        session_id: record.session_id,
        content: record.content,
        created: record.created,
    }))
}

/// DELETE /api/v1/sessions/:session_id
#[tracing::instrument(skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(session_id) = path?;
    let session_id = SessionId::parse(&session_id)?;

    if state.store.delete(&session_id)? {
        info!("Deleted session");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Session {} not found", session_id)))
    }
}
