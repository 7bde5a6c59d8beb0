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

//! Personality-analysis service clients
//!
//! The server only ever talks to an [`AnalysisClient`]; the HTTP
//! implementation lives in [`http`].

use traitscope_core::{ProfileDocument, ProfileError};

mod http;
pub use http::HttpAnalysisClient;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("analysis service timed out")]
    Timeout,

    #[error("analysis service unreachable: {0}")]
    Transport(String),

    #[error("analysis service returned an invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

/// Turns free text into a validated profile document.
#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<ProfileDocument, AnalysisError>;

    fn name(&self) -> &str;
}
