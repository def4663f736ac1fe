//! Server configuration.
//!
//! Resolved once at startup from [`Properties`] over built-in defaults, then
//! treated as immutable by the running host.

use std::path::PathBuf;

use crate::config::loader::{ConfigError, Properties};
use crate::routing::registry;

pub const PORT_KEY: &str = "server.port";
pub const GRACE_PERIOD_KEY: &str = "server.gracePeriodInSeconds";
pub const MAX_CONNECTIONS_KEY: &str = "server.maxConnections";
pub const PREFIXES_KEY: &str = "jersey.prefixes";
pub const URL_PATH_KEY: &str = "featurehub.url-path";
pub const NGINX_KEY: &str = "run.nginx";
pub const ASSET_DIR_KEY: &str = "web.asset-dir";
pub const LOG_LEVEL_KEY: &str = "log.level";

/// Configuration for the web host.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port bound on `0.0.0.0`.
    pub port: u16,

    /// Upper bound on the shutdown drain, in seconds.
    pub grace_period_secs: u64,

    /// Cleared by the embedding service when it never serves web assets.
    pub allowed_web_hosting: bool,

    /// Ordered API URL patterns, highest precedence first.
    pub api_prefixes: Vec<String>,

    /// Mount path the service answers under (`/` when unmounted).
    pub offset_path: String,

    /// Deployment flag: this process fronts the web app itself.
    pub run_nginx: bool,

    /// Directory holding the single-page app.
    pub asset_dir: PathBuf,

    /// Maximum concurrently served connections.
    pub max_connections: usize,

    /// Default log level when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8903,
            grace_period_secs: 10,
            allowed_web_hosting: true,
            api_prefixes: registry::default_prefixes(),
            offset_path: "/".to_string(),
            run_nginx: false,
            asset_dir: PathBuf::from("web"),
            max_connections: 10_000,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Resolve configuration from properties over the defaults.
    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_prefixes = registry::resolve_prefixes(props.get(PREFIXES_KEY).as_deref());
        if api_prefixes.is_empty() {
            tracing::warn!(key = PREFIXES_KEY, "Prefix override is empty, no API routes will be mounted");
        }

        Ok(Self {
            port: props.get_parsed(PORT_KEY)?.unwrap_or(defaults.port),
            grace_period_secs: props
                .get_parsed(GRACE_PERIOD_KEY)?
                .unwrap_or(defaults.grace_period_secs),
            allowed_web_hosting: defaults.allowed_web_hosting,
            api_prefixes,
            offset_path: props
                .get(URL_PATH_KEY)
                .filter(|path| !path.is_empty())
                .unwrap_or(defaults.offset_path),
            run_nginx: props.contains(NGINX_KEY),
            asset_dir: props
                .get(ASSET_DIR_KEY)
                .map(PathBuf::from)
                .unwrap_or(defaults.asset_dir),
            max_connections: props
                .get_parsed(MAX_CONNECTIONS_KEY)?
                .unwrap_or(defaults.max_connections),
            log_level: props.get(LOG_LEVEL_KEY).unwrap_or(defaults.log_level),
        })
    }

    /// Mount prefix used for rule registration: the offset path without its
    /// trailing slash, so `/` becomes the empty root.
    pub fn context_path(&self) -> String {
        self.offset_path
            .strip_suffix('/')
            .unwrap_or(&self.offset_path)
            .to_string()
    }

    /// Static assets are served only when allowed and the process runs as
    /// the web front itself.
    pub fn web_hosting_active(&self) -> bool {
        self.allowed_web_hosting && self.run_nginx
    }

    pub fn base_url(&self, port: u16) -> String {
        format!("http://0.0.0.0:{}{}", port, self.offset_path)
    }
}
