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
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Serialize;
use traitscope_core::{chart_data, locate, ChartData};
use tracing::debug;

use crate::api::description::SessionQuery;
use crate::api::{require_session_id, ApiError, AppState};

/// Response for GET /getGraph/:id
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    /// The id that was asked for
    pub id: String,
    /// Display name of the node the slices were taken from
    pub name: String,
    #[serde(flatten)]
    pub chart: ChartData,
}

/// GET /getGraph/:id?sessionId= - Chart slices for one trait's children
#[tracing::instrument(skip(state))]
pub async fn get_graph(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<GraphResponse>, ApiError> {
    let Path(id) = path?;
    let Query(query) = query?;
    let session_id = require_session_id(query.session_id.as_deref())?;
    let record = state.load_session(&session_id)?;

    let node = locate(&id, record.response.top_level())
        .ok_or_else(|| ApiError::NotFound(format!("Trait {} not found in profile", id)))?;

    let chart = chart_data(node, &state.chart_style);
    debug!(slices = chart.slices.len(), resolved = %node.id, "Built chart");

    Ok(Json(GraphResponse {
        name: node.name.clone(),
        id,
        chart,
    }))
}
