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

use super::{AnalysisClient, AnalysisError};
use crate::config::AnalysisConfig;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_LANGUAGE, CONTENT_TYPE};
use serde::Deserialize;
use std::time::{Duration, Instant};
use traitscope_core::ProfileDocument;
use tracing::{debug, warn};

/// Longest raw error body echoed back in an error message
const MAX_ERROR_BODY: usize = 256;

#[derive(Debug, Clone)]
enum Credentials {
    Basic { username: String, password: String },
    Bearer(String),
}

/// Error body shape used by the analysis service
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: String,
    #[serde(default)]
    help: Option<String>,
}

/// Posts plain text to a profile endpoint and parses the JSON reply.
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<Credentials>,
    language: Option<String>,
    timeout: Duration,
}

impl HttpAnalysisClient {
    pub fn new(config: &AnalysisConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("traitscope/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let credentials = match (&config.username, &config.password, &config.api_key) {
            (Some(username), Some(password), _) => Some(Credentials::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            (None, None, Some(key)) => Some(Credentials::Bearer(key.clone())),
            (None, None, None) => None,
            _ => anyhow::bail!("Analysis username and password must be set together"),
        };

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            credentials,
            language: config.language.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, text: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(ACCEPT, "application/json")
            .body(text.to_owned());

        if let Some(language) = &self.language {
            request = request
                .header(CONTENT_LANGUAGE, language)
                .header(ACCEPT_LANGUAGE, language);
        }

        match &self.credentials {
            Some(Credentials::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            Some(Credentials::Bearer(key)) => request.bearer_auth(key),
            None => request,
        }
    }
}

fn transport_error(err: reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        AnalysisError::Timeout
    } else {
        AnalysisError::Transport(err.to_string())
    }
}

fn service_error(status: reqwest::StatusCode, body: &str) -> AnalysisError {
    let message = match serde_json::from_str::<ServiceErrorBody>(body) {
        Ok(ServiceErrorBody {
            error,
            help: Some(help),
        }) => format!("{} ({})", error, help),
        Ok(ServiceErrorBody { error, help: None }) => error,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body.trim().chars().take(MAX_ERROR_BODY).collect(),
    };

    AnalysisError::Service {
        status: status.as_u16(),
        message,
    }
}

#[async_trait::async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, text: &str) -> Result<ProfileDocument, AnalysisError> {
        let start = Instant::now();

        let response = self
            .request(text)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                "Analysis service rejected request"
            );
            return Err(service_error(status, &body));
        }

        let document = ProfileDocument::from_json(&body)?;

        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            word_count = ?document.word_count,
            "Analysis service returned profile"
        );

        Ok(document)
    }

    fn name(&self) -> &str {
        "http"
    }
}
