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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use traitscope_core::DEFAULT_CHARTABLE_IDS;
use url::Url;

/// Traitscope Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP listen address (e.g., "127.0.0.1:3000")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Base URL chart links are built on. Defaults to `http://{listen_addr}`.
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            public_base_url: None,
            request_timeout_secs: default_request_timeout(),
            enable_cors: default_enable_cors(),
            cors_origins: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => anyhow::bail!("Unknown storage backend '{}' (expected memory or file)", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Sessions kept in the file backend's read cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Profile endpoint of the personality-analysis service
    #[serde(default = "default_analysis_endpoint")]
    pub endpoint: String,

    /// Basic auth username (requires password)
    pub username: Option<String>,

    /// Basic auth password (requires username)
    pub password: Option<String>,

    /// Bearer API key, used when no basic auth credentials are set
    pub api_key: Option<String>,

    /// Per-call timeout in seconds
    #[serde(default = "default_analysis_timeout")]
    pub timeout_secs: u64,

    /// Submissions with fewer words are rejected before calling the service
    #[serde(default = "default_min_word_count")]
    pub min_word_count: usize,

    /// Submissions larger than this are rejected
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,

    /// Content and response language sent to the service (e.g., "en")
    pub language: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_analysis_endpoint(),
            username: None,
            password: None,
            api_key: None,
            timeout_secs: default_analysis_timeout(),
            min_word_count: default_min_word_count(),
            max_text_bytes: default_max_text_bytes(),
            language: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Trait ids that get a chart link in the description outline
    #[serde(default = "default_chartable_ids")]
    pub chartable_ids: Vec<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            chartable_ids: default_chartable_ids(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// tracing filter directive; `RUST_LOG` wins when set
    pub filter: Option<String>,

    /// Emit JSON log lines
    #[serde(default)]
    pub json: bool,
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_enable_cors() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./traitscope-data")
}

fn default_cache_capacity() -> u64 {
    1024
}

fn default_analysis_endpoint() -> String {
    "http://127.0.0.1:8090/v2/profile".to_string()
}

fn default_analysis_timeout() -> u64 {
    30
}

fn default_min_word_count() -> usize {
    100
}

fn default_max_text_bytes() -> usize {
    1_000_000
}

fn default_chartable_ids() -> Vec<String> {
    DEFAULT_CHARTABLE_IDS.iter().map(|id| id.to_string()).collect()
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        // Override with environment variables
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Override fields whose variable is set. Unparseable numbers and
    /// booleans are ignored.
    ///
    /// Supported environment variables:
    /// - TRAITSCOPE_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:3000)
    /// - TRAITSCOPE_BASE_URL: Public base URL for chart links
    /// - TRAITSCOPE_REQUEST_TIMEOUT: Request timeout in seconds (default: 60)
    /// - TRAITSCOPE_ENABLE_CORS: Enable CORS (default: true)
    /// - TRAITSCOPE_STORAGE: Storage backend, memory or file (default: memory)
    /// - TRAITSCOPE_DATA_DIR: Data directory for the file backend
    /// - TRAITSCOPE_ANALYSIS_URL: Analysis service profile endpoint
    /// - TRAITSCOPE_ANALYSIS_USERNAME / TRAITSCOPE_ANALYSIS_PASSWORD: Basic auth
    /// - TRAITSCOPE_ANALYSIS_API_KEY: Bearer API key
    /// - TRAITSCOPE_MIN_WORDS: Minimum word count per submission (default: 100)
    /// - TRAITSCOPE_LOG_JSON: Emit JSON logs (default: false)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("TRAITSCOPE_HTTP_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Some(base_url) = lookup("TRAITSCOPE_BASE_URL") {
            self.server.public_base_url = Some(base_url);
        }
        if let Some(val) = lookup("TRAITSCOPE_REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.server.request_timeout_secs = val;
        }
        if let Some(val) = lookup("TRAITSCOPE_ENABLE_CORS").and_then(|v| v.parse().ok()) {
            self.server.enable_cors = val;
        }

        if let Some(val) = lookup("TRAITSCOPE_STORAGE").and_then(|v| v.parse().ok()) {
            self.storage.backend = val;
        }
        if let Some(data_dir) = lookup("TRAITSCOPE_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Some(endpoint) = lookup("TRAITSCOPE_ANALYSIS_URL") {
            self.analysis.endpoint = endpoint;
        }
        if let Some(username) = lookup("TRAITSCOPE_ANALYSIS_USERNAME") {
            self.analysis.username = Some(username);
        }
        if let Some(password) = lookup("TRAITSCOPE_ANALYSIS_PASSWORD") {
            self.analysis.password = Some(password);
        }
        if let Some(key) = lookup("TRAITSCOPE_ANALYSIS_API_KEY") {
            self.analysis.api_key = Some(key);
        }
        if let Some(val) = lookup("TRAITSCOPE_MIN_WORDS").and_then(|v| v.parse().ok()) {
            self.analysis.min_word_count = val;
        }

        if let Some(val) = lookup("TRAITSCOPE_LOG_JSON").and_then(|v| v.parse().ok()) {
            self.logging.json = val;
        }
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// Base URL for chart links, without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.server.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.server.listen_addr),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be greater than 0");
        }

        let base = Url::parse(&self.base_url())
            .map_err(|e| anyhow::anyhow!("Invalid public base URL '{}': {}", self.base_url(), e))?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("Public base URL must use http or https");
        }

        let endpoint = Url::parse(&self.analysis.endpoint).map_err(|e| {
            anyhow::anyhow!(
                "Invalid analysis endpoint '{}': {}",
                self.analysis.endpoint,
                e
            )
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("Analysis endpoint must use http or https");
        }

        if self.analysis.username.is_some() != self.analysis.password.is_some() {
            anyhow::bail!("Analysis username and password must be set together");
        }

        if self.analysis.timeout_secs == 0 {
            anyhow::bail!("analysis.timeout_secs must be greater than 0");
        }

        if self.storage.backend == StorageBackend::File && !self.storage.data_dir.exists() {
            std::fs::create_dir_all(&self.storage.data_dir)?;
        }

        Ok(())
    }
}
