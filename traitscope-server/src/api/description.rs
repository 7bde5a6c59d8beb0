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

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use traitscope_core::{flatten, DisplayItem, FlattenContext, SessionId};
use tracing::debug;

use crate::api::{require_session_id, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Response for GET /description
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionResponse {
    pub session_id: SessionId,
    pub items: Vec<DisplayItem>,
}

/// GET /description?sessionId= - Flattened outline of the stored profile
#[tracing::instrument(skip(state))]
pub async fn get_description(
    State(state): State<AppState>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<DescriptionResponse>, ApiError> {
    let Query(query) = query?;
    let session_id = require_session_id(query.session_id.as_deref())?;
    let record = state.load_session(&session_id)?;

    let ctx = FlattenContext::new(&state.display, &state.base_url, session_id.as_str());
    let items = flatten(record.response.top_level(), &ctx);
    debug!(items = items.len(), "Flattened profile");

    Ok(Json(DescriptionResponse { session_id, items }))
}
