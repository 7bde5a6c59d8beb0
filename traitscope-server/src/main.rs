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
use clap::Parser;
use std::path::PathBuf;
use traitscope_server::{
    config::{ServerConfig, StorageBackend},
    run_server,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, env = "TRAITSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides config file)
    #[arg(long, env = "TRAITSCOPE_HTTP_ADDR")]
    http_addr: Option<String>,

    /// Public base URL used in chart links
    #[arg(long, env = "TRAITSCOPE_BASE_URL")]
    base_url: Option<String>,

    /// Session storage backend: memory or file
    #[arg(long, env = "TRAITSCOPE_STORAGE")]
    storage: Option<StorageBackend>,

    /// Data directory path for the file backend (overrides config file)
    #[arg(long, env = "TRAITSCOPE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Analysis service profile endpoint
    #[arg(long, env = "TRAITSCOPE_ANALYSIS_URL")]
    analysis_url: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = ServerConfig::load(args.config)?;

    // Apply CLI overrides
    if let Some(addr) = args.http_addr {
        config.server.listen_addr = addr;
    }
    if let Some(base_url) = args.base_url {
        config.server.public_base_url = Some(base_url);
    }
    if let Some(storage) = args.storage {
        config.storage.backend = storage;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }
    if let Some(endpoint) = args.analysis_url {
        config.analysis.endpoint = endpoint;
    }
    if args.log_json {
        config.logging.json = true;
    }

    // Run server
    run_server(config).await
}
