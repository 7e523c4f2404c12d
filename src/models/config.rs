//! Application configuration structures.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Origin site layout
    #[serde(default)]
    pub site: SiteConfig,

    /// Delay between viewer requests
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Job retention
    #[serde(default)]
    pub jobs: JobConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.page_timeout_secs == 0 {
            return Err(AppError::validation("http.page_timeout_secs must be > 0"));
        }
        if self.http.image_timeout_secs == 0 {
            return Err(AppError::validation("http.image_timeout_secs must be > 0"));
        }
        if self.http.connect_timeout_secs == 0 {
            return Err(AppError::validation(
                "http.connect_timeout_secs must be > 0",
            ));
        }
        self.site.viewer_url()?;
        if self.site.tooltip_class.trim().is_empty() {
            return Err(AppError::validation("site.tooltip_class is empty"));
        }
        if self.pacing.min_delay_ms > self.pacing.max_delay_ms {
            return Err(AppError::validation(
                "pacing.min_delay_ms must be <= pacing.max_delay_ms",
            ));
        }
        if self.jobs.ttl_secs > 0 && self.jobs.sweep_interval_secs == 0 {
            return Err(AppError::validation(
                "jobs.sweep_interval_secs must be > 0 when jobs.ttl_secs is set",
            ));
        }
        if self.server.archive_filename.trim().is_empty() {
            return Err(AppError::validation("server.archive_filename is empty"));
        }
        self.server
            .bind
            .parse::<SocketAddr>()
            .map_err(|e| AppError::validation(format!("server.bind is invalid: {e}")))?;
        Ok(())
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Referer header sent to the origin site
    #[serde(default = "defaults::referer")]
    pub referer: String,

    /// Accept-Language header
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Timeout for gallery and viewer pages
    #[serde(default = "defaults::page_timeout")]
    pub page_timeout_secs: u64,

    /// Timeout for image downloads
    #[serde(default = "defaults::image_timeout")]
    pub image_timeout_secs: u64,

    /// TCP connect timeout
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            referer: defaults::referer(),
            accept_language: defaults::accept_language(),
            page_timeout_secs: defaults::page_timeout(),
            image_timeout_secs: defaults::image_timeout(),
            connect_timeout_secs: defaults::connect_timeout(),
        }
    }
}

/// Layout of the origin site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute prefix every viewer page URL starts with
    #[serde(default = "defaults::viewer_prefix")]
    pub viewer_prefix: String,

    /// Class of the elements wrapping gallery thumbnails
    #[serde(default = "defaults::tooltip_class")]
    pub tooltip_class: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            viewer_prefix: defaults::viewer_prefix(),
            tooltip_class: defaults::tooltip_class(),
        }
    }
}

impl SiteConfig {
    /// Parse the viewer prefix, rejecting relative or root-path prefixes.
    pub fn viewer_url(&self) -> Result<Url> {
        let url = Url::parse(&self.viewer_prefix)
            .map_err(|e| AppError::validation(format!("site.viewer_prefix: {e}")))?;
        if url.host_str().is_none() || url.path() == "/" {
            return Err(AppError::validation(
                "site.viewer_prefix needs a host and a viewer path",
            ));
        }
        Ok(url)
    }

    /// Root-relative viewer path, e.g. `/i/`.
    pub fn viewer_path(&self) -> String {
        self.viewer_url()
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| "/i/".to_string())
    }

    /// Host plus viewer path without the scheme, e.g. `imx.to/i/`.
    pub fn viewer_marker(&self) -> String {
        let prefix = self.viewer_prefix.as_str();
        prefix
            .split_once("://")
            .map_or(prefix, |(_, rest)| rest)
            .to_string()
    }
}

/// Randomized delay between consecutive viewer requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "defaults::min_delay")]
    pub min_delay_ms: u64,

    #[serde(default = "defaults::max_delay")]
    pub max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: defaults::min_delay(),
            max_delay_ms: defaults::max_delay(),
        }
    }
}

/// Job retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Evict finished jobs not accessed for this long (0 keeps them forever)
    #[serde(default)]
    pub ttl_secs: u64,

    /// How often the eviction sweep runs
    #[serde(default = "defaults::sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 0,
            sweep_interval_secs: defaults::sweep_interval(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "defaults::bind")]
    pub bind: String,

    /// CORS origins; `*` allows any
    #[serde(default = "defaults::allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Filename offered in the archive download
    #[serde(default = "defaults::archive_filename")]
    pub archive_filename: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
            allowed_origins: defaults::allowed_origins(),
            archive_filename: defaults::archive_filename(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn referer() -> String {
        "https://imx.to/".into()
    }
    pub fn accept_language() -> String {
        "en-US,en;q=0.9".into()
    }
    pub fn page_timeout() -> u64 {
        10
    }
    pub fn image_timeout() -> u64 {
        15
    }
    pub fn connect_timeout() -> u64 {
        10
    }

    // Site defaults
    pub fn viewer_prefix() -> String {
        "https://imx.to/i/".into()
    }
    pub fn tooltip_class() -> String {
        "tooltip".into()
    }

    // Pacing defaults
    pub fn min_delay() -> u64 {
        500
    }
    pub fn max_delay() -> u64 {
        1200
    }

    pub fn sweep_interval() -> u64 {
        60
    }

    // Server defaults
    pub fn bind() -> String {
        "0.0.0.0:8000".into()
    }
    pub fn allowed_origins() -> Vec<String> {
        vec!["*".into()]
    }
    pub fn archive_filename() -> String {
        "gallery_images.zip".into()
    }
}
