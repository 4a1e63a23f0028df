use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use horizon_core::{
    find_config_file, load_config, CloudBand, ConfigSource, DEFAULT_ELEVATION_URL,
    DEFAULT_TIMEOUT_SECS, EXTRA_LINE_KM, OBSERVER_HEIGHT_M,
};
use slog::{error, info, o, Drain, Level, Logger};
use std::{env, fs, path::Path, time::Duration};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::Click;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON layer command per line
    #[default]
    Json,
    /// Human readable info panel
    Text,
}

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Clouds Horizon Distance - turns map clicks into cloud horizon overlays"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $HORIZON_DAEMON_CONFIG, ./daemon.toml,
    /// $XDG_CONFIG_HOME/horizon-distance/daemon.toml, /etc/horizon-distance/daemon.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "HORIZON_DAEMON_LEVEL")]
    pub level: Option<String>,

    /// Base URL of the open-elevation compatible lookup service
    #[arg(short, long, env = "HORIZON_DAEMON_ELEVATION_URL")]
    pub elevation_url: Option<String>,

    /// HTTP User-Agent header for elevation requests
    #[arg(short, long, env = "HORIZON_DAEMON_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Timeout of one elevation lookup in seconds
    #[arg(short, long, env = "HORIZON_DAEMON_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Retries of transient HTTP failures during one lookup
    #[arg(short = 'r', long, env = "HORIZON_DAEMON_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Eye height of the observer above the ground in meters
    #[arg(long, env = "HORIZON_DAEMON_OBSERVER_HEIGHT_M")]
    pub observer_height_m: Option<f64>,

    /// How far the sun lines reach past the highest cloud circle, in km
    #[arg(long, env = "HORIZON_DAEMON_EXTRA_LINE_KM")]
    pub extra_line_km: Option<f64>,

    /// Output written to stdout
    #[arg(short, long, value_enum, env = "HORIZON_DAEMON_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Also write an HTML map of the latest overlay to this path
    #[arg(long, env = "HORIZON_DAEMON_HTML")]
    pub html: Option<String>,

    /// Latitude of a single click; without it clicks are read from stdin
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    #[serde(skip)]
    pub lat: Option<f64>,

    /// Longitude of a single click
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    #[serde(skip)]
    pub lon: Option<f64>,

    /// Instant of the single click (RFC3339), defaults to now
    #[arg(long)]
    #[serde(skip)]
    pub at: Option<String>,

    /// Cloud bands, config file only
    #[arg(skip)]
    pub bands: Option<Vec<CloudBand>>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn elevation_url(&self) -> String {
        self.elevation_url
            .clone()
            .unwrap_or_else(|| DEFAULT_ELEVATION_URL.to_string())
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("horizon-daemon/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(0)
    }

    pub fn observer_height_m(&self) -> f64 {
        self.observer_height_m.unwrap_or(OBSERVER_HEIGHT_M)
    }

    pub fn extra_line_km(&self) -> f64 {
        self.extra_line_km.unwrap_or(EXTRA_LINE_KM)
    }

    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    pub fn bands(&self) -> Vec<CloudBand> {
        match &self.bands {
            Some(bands) if !bands.is_empty() => bands.clone(),
            _ => CloudBand::defaults(),
        }
    }

    /// The click given on the command line, if any
    pub fn click(&self) -> Result<Option<Click>, anyhow::Error> {
        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            return Ok(None);
        };
        let at = match &self.at {
            Some(at) => Some(
                OffsetDateTime::parse(at, &Rfc3339)
                    .map_err(|e| anyhow!("invalid --at instant {}: {}", at, e))?,
            ),
            None => None,
        };
        Ok(Some(Click { lat, lon, at }))
    }

    /// CLI args override file config (env vars are handled by clap)
    pub fn merge(self, file_config: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file_config.level),
            elevation_url: self.elevation_url.or(file_config.elevation_url),
            user_agent: self.user_agent.or(file_config.user_agent),
            timeout_secs: self.timeout_secs.or(file_config.timeout_secs),
            max_retries: self.max_retries.or(file_config.max_retries),
            observer_height_m: self.observer_height_m.or(file_config.observer_height_m),
            extra_line_km: self.extra_line_km.or(file_config.extra_line_km),
            format: self.format.or(file_config.format),
            html: self.html.or(file_config.html),
            lat: self.lat,
            lon: self.lon,
            at: self.at,
            bands: self.bands.or(file_config.bands),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Result<Cli, anyhow::Error> {
    with_config_file(Cli::parse())
}

/// Merge the config file found for `cli_args` under them. A file that exists
/// but cannot be read or parsed is an error, as is a missing `--config` path.
pub fn with_config_file(cli_args: Cli) -> Result<Cli, anyhow::Error> {
    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("HORIZON_DAEMON_CONFIG", "daemon.toml")
    };

    let file_config: Cli =
        load_config(&source).map_err(|e| anyhow!("failed to load config {}: {}", source, e))?;
    Ok(cli_args.merge(file_config))
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

/// Logs go to stderr, stdout carries the overlay output
pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Create the parent folder of `file_path` if it is missing
pub fn create_parent_folder(file_path: &str, logger: &Logger) {
    let Some(parent) = Path::new(file_path).parent() else {
        return;
    };
    if parent.as_os_str().is_empty() || parent.is_dir() {
        return;
    }
    if let Err(err) = fs::create_dir_all(parent) {
        error!(logger, "error creating folder: {}", err);
    } else {
        info!(logger, "folder created: {}", parent.display());
    }
}
