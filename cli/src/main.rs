// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `gpu-webmap` command line tool.
//!
//! - `apply`: replace the drawing info of the layers of a web map with the
//!   stored symbology files.
//! - `prune`: drop renderer classes that do not occur in the layer data.
//! - `run`: `apply` then `prune`.

mod config;

use clap::Parser;
use clap::Subcommand;
use config::Config;
use gpu_webmap::PruneConfig;
use gpu_webmap::RendererPruner;
use gpu_webmap::SymbologyCatalog;
use gpu_webmap::SymbologyOutcome;
use gpu_webmap_core::ItemId;
use gpu_webmap_core::PortalCredentials;
use gpu_webmap_portal_http::reqwest::Client;
use gpu_webmap_portal_http::HttpPortal;
use gpu_webmap_portal_http::TokenSettings;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::fs::OpenOptions;
use std::io::Error as IoError;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;
use url::Url;

type Portal = HttpPortal<Client>;

/// Symbology tool for GPU planning web maps.
#[derive(Parser, Debug)]
#[command(name = "gpu-webmap")]
#[command(about = "Apply and prune symbology of GPU planning web maps", long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Portal root URL. Overrides `portal` of the configuration.
    #[arg(long)]
    portal: Option<Url>,
    /// Portal user. Overrides `username` of the configuration.
    #[arg(short, long)]
    username: Option<String>,
    /// Portal password.
    #[arg(long, env = "GPU_WEBMAP_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Log file written in addition to stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply stored symbology files to the layers of a web map.
    Apply {
        /// Web map item id.
        #[arg(short, long)]
        webmap: String,
        /// Directory of the symbology files.
        #[arg(short, long)]
        symbology_dir: Option<PathBuf>,
    },
    /// Keep only the renderer classes present in the layer data.
    Prune {
        /// Web map item id.
        #[arg(short, long)]
        webmap: String,
        /// Number of leading layers left untouched.
        #[arg(long)]
        skip_leading_layers: Option<usize>,
    },
    /// Apply stored symbology, then prune renderers.
    Run {
        /// Web map item id.
        #[arg(short, long)]
        webmap: String,
        /// Directory of the symbology files.
        #[arg(short, long)]
        symbology_dir: Option<PathBuf>,
        /// Number of leading layers left untouched.
        #[arg(long)]
        skip_leading_layers: Option<usize>,
    },
}

enum Error {
    Config(config::Error),
    LogFile(PathBuf, IoError),
    MissingPortal,
    MissingPassword(String),
    Client(gpu_webmap_portal_http::reqwest::PortalError),
    Webmap(gpu_webmap::Error<Portal>),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::LogFile(path, err) => {
                write!(f, "cannot open log file {}: {err}", path.display())
            }
            Self::MissingPortal => write!(f, "portal URL is not configured"),
            Self::MissingPassword(user) => write!(
                f,
                "no password for {user}: use --password or GPU_WEBMAP_PASSWORD"
            ),
            Self::Client(err) => write!(f, "cannot create HTTP client: {err}"),
            Self::Webmap(err) => write!(f, "{err}"),
        }
    }
}

// Returned from `main`, which prints the `Debug` form.
impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl StdError for Error {}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::read(path).map_err(Error::Config)?,
        None => Config::default(),
    };
    let _log_guard = init_logging(cli.log_file.as_deref().or(config.log_file.as_deref()))?;

    let portal = Arc::new(connect(&cli, &config)?);
    match &cli.command {
        Commands::Apply {
            webmap,
            symbology_dir,
        } => apply(&portal, &config, webmap, symbology_dir.as_deref()).await,
        Commands::Prune {
            webmap,
            skip_leading_layers,
        } => prune(portal, &config, webmap, *skip_leading_layers).await,
        Commands::Run {
            webmap,
            symbology_dir,
            skip_leading_layers,
        } => {
            apply(&portal, &config, webmap, symbology_dir.as_deref()).await?;
            prune(portal, &config, webmap, *skip_leading_layers).await
        }
    }
}

/// Install stderr logging, plus `log_file` when given. The returned guard
/// flushes the file on drop.
fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, Error> {
    let (file_writer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = log_file_writer(path)?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };
    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
    });
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(guard)
}

/// Background writer appending to `path`.
fn log_file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), Error> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| Error::LogFile(path.into(), err))?;
    Ok(tracing_appender::non_blocking(file))
}

fn connect(cli: &Cli, config: &Config) -> Result<Portal, Error> {
    let endpoint = cli
        .portal
        .clone()
        .or_else(|| config.portal.clone())
        .ok_or(Error::MissingPortal)?;

    let client = Client::with_params(&config.http).map_err(|err| Error::Client(err.into()))?;

    let Some(username) = cli.username.clone().or_else(|| config.username.clone()) else {
        warn!(%endpoint, "no username configured, using anonymous access");
        return Ok(HttpPortal::anonymous(client, endpoint));
    };
    let password = cli
        .password
        .clone()
        .ok_or_else(|| Error::MissingPassword(username.clone()))?;
    let mut token_settings = TokenSettings::default();
    if let Some(minutes) = config.token_expiration_minutes {
        token_settings = token_settings.with_expiration(Duration::from_secs(minutes * 60));
    }
    info!(%endpoint, %username, "connecting to portal");
    Ok(HttpPortal::new(
        client,
        endpoint,
        PortalCredentials::new(username, password),
        token_settings,
    ))
}

async fn apply(
    portal: &Portal,
    config: &Config,
    webmap: &str,
    symbology_dir: Option<&Path>,
) -> Result<(), Error> {
    let catalog = symbology_dir
        .or(config.symbology_dir.as_deref())
        .map_or_else(SymbologyCatalog::default, SymbologyCatalog::new);
    let layers = catalog
        .apply_webmap(portal, &ItemId::from(webmap))
        .await
        .map_err(Error::Webmap)?;
    let applied = layers
        .iter()
        .filter(|l| matches!(l.outcome, SymbologyOutcome::Applied { .. }))
        .count();
    let failed = layers
        .iter()
        .filter(|l| matches!(l.outcome, SymbologyOutcome::Failed(_)))
        .count();
    info!(applied, failed, layers = layers.len(), "symbology applied");
    Ok(())
}

async fn prune(
    portal: Arc<Portal>,
    config: &Config,
    webmap: &str,
    skip_leading_layers: Option<usize>,
) -> Result<(), Error> {
    let prune_config = PruneConfig {
        skip_leading_layers: skip_leading_layers.unwrap_or(config.prune.skip_leading_layers),
        field_keys: config.prune.field_keys.clone(),
    };
    RendererPruner::new(portal, prune_config)
        .prune_webmap(&ItemId::from(webmap))
        .await
        .map_err(Error::Webmap)?;
    Ok(())
}
