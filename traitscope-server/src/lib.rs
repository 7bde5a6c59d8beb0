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

//! Traitscope Server
//!
//! Accepts free text, has it profiled by a personality-analysis service,
//! stores the profile per session and serves it back as a flattened outline
//! and as per-trait chart data.

pub mod analysis;
pub mod api;
pub mod config;

use anyhow::Result;
use axum::{
    error_handling::HandleErrorLayer, extract::DefaultBodyLimit, http::HeaderValue, BoxError,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use traitscope_core::DisplayPolicy;
use traitscope_storage::{FileSessionStore, MemorySessionStore, SessionStore};

use analysis::{AnalysisClient, HttpAnalysisClient};
use api::{ApiError, AppState, Limits};
use config::{LoggingConfig, ServerConfig, StorageBackend};

/// Filter used when neither `RUST_LOG` nor `logging.filter` is set
pub const DEFAULT_LOG_FILTER: &str =
    "traitscope_server=info,traitscope_storage=info,tower_http=info";

/// Headroom over `max_text_bytes` for the JSON envelope around the text
const BODY_OVERHEAD: usize = 64 * 1024;

/// Install the global tracing subscriber. A second call is a no-op.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
    });

    let result = if logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Build the session store selected by `[storage]`.
pub fn build_store(config: &ServerConfig) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemorySessionStore::new()),
        StorageBackend::File => Arc::new(FileSessionStore::open(
            &config.storage.data_dir,
            config.storage.cache_capacity,
        )?),
    };
    tracing::info!("Session store: {}", store.backend());
    Ok(store)
}

/// Assemble shared state from config and the two collaborators.
pub fn build_state(
    config: &ServerConfig,
    store: Arc<dyn SessionStore>,
    analyzer: Arc<dyn AnalysisClient>,
) -> AppState {
    AppState::new(store, analyzer)
        .with_display(DisplayPolicy::with_chartable_ids(
            config.display.chartable_ids.iter().cloned(),
        ))
        .with_base_url(&config.base_url())
        .with_limits(Limits {
            min_word_count: config.analysis.min_word_count,
            max_text_bytes: config.analysis.max_text_bytes,
        })
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.server.cors_origins.is_empty() {
        tracing::warn!("CORS: Allowing all origins. Set cors_origins in production!");
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("CORS: Ignoring invalid origin {:?}", origin);
                None
            }
        })
        .collect();
    tracing::info!("CORS: Allowing origins: {:?}", config.server.cors_origins);
    cors.allow_origin(AllowOrigin::list(origins))
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::RequestTimeout("request took too long".to_string())
    } else {
        ApiError::Internal(err.to_string())
    }
}

/// Router with all routes and layers applied.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let mut app = api::router(state)
        .layer(DefaultBodyLimit::max(
            config.analysis.max_text_bytes.saturating_add(BODY_OVERHEAD),
        ))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(config.server.request_timeout_secs)),
        );

    if config.server.enable_cors {
        app = app.layer(cors_layer(config));
    }

    app.layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Run the HTTP server until Ctrl-C.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    init_tracing(&config.logging);

    tracing::info!("Starting Traitscope Server v{}", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    let store = build_store(&config)?;
    let analyzer = Arc::new(HttpAnalysisClient::new(&config.analysis)?);
    tracing::info!("Analysis service: {}", analyzer.endpoint());

    let state = build_state(&config, store, analyzer);
    let app = build_app(state, &config);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Chart links use base URL {}", config.base_url());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
