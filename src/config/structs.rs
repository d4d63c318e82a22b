use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::validators::{require, validate_http_url, validate_mount_path};
use crate::errors::{MetricsError, Result};
use crate::system::identity;
use crate::utils::TimeParser;

/// Default config file, read if present.
pub const DEFAULT_CONFIG_FILE: &str = "promrelay.toml";

fn default_push_timeout() -> String {
    "5s".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Plugin configuration, loaded from TOML and environment variables
///
/// Environment variable names are the upper-cased field names, e.g.
/// `PUSH_GATEWAY_URL`.
/// Precedence: ENV > promrelay.toml > defaults
#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub push_gateway_url: Option<String>,
    #[serde(default)]
    pub push_job_name: Option<String>,
    #[serde(default)]
    pub push_frequency: Option<String>,
    #[serde(default = "default_push_timeout")]
    pub push_timeout: String,
    #[serde(default)]
    pub metrics_mount_path: Option<String>,
    #[serde(default)]
    pub root_url: Option<String>,
    #[serde(default)]
    pub worker_id: Option<String>,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            push_gateway_url: None,
            push_job_name: None,
            push_frequency: None,
            push_timeout: default_push_timeout(),
            metrics_mount_path: None,
            root_url: None,
            worker_id: None,
            test_mode: false,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            log_file: None,
        }
    }
}

/// Everything the push dispatcher needs, resolved and validated.
#[derive(Debug, Clone)]
pub struct PushSettings {
    pub gateway_url: Url,
    pub job_name: String,
    pub interval: Duration,
    pub timeout: Duration,
    /// `instance` grouping label
    pub instance: String,
    /// `installation_domain` grouping label
    pub installation_domain: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<String>,
}

impl PluginConfig {
    /// Load `.env`, then `promrelay.toml` (optional), then the process
    /// environment, and validate the result.
    pub fn load() -> Result<Self> {
        // a missing .env is fine
        let _ = dotenvy::dotenv();
        Self::load_from(Some(Path::new(DEFAULT_CONFIG_FILE)), None)
    }

    /// Load from an optional file and an explicit environment map.
    ///
    /// `env = None` reads the process environment.
    pub fn load_from(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();
        if let Some(path) = path {
            // 1. optional TOML file
            builder = builder.add_source(File::from(path).required(false));
        }
        // 2. environment overrides, no prefix
        builder = builder.add_source(Environment::default().try_parsing(true).source(env));

        let config: PluginConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            push = config.gateway_url().is_some(),
            mount_path = ?config.mount_path(),
            worker = ?config.worker_id(),
            "plugin configuration loaded"
        );
        Ok(config)
    }

    pub fn gateway_url(&self) -> Option<&str> {
        non_empty(&self.push_gateway_url)
    }

    pub fn mount_path(&self) -> Option<&str> {
        non_empty(&self.metrics_mount_path)
    }

    pub fn worker_id(&self) -> Option<&str> {
        non_empty(&self.worker_id)
    }

    /// Check cross-field rules. Called by `load_from`; call it yourself
    /// when building the struct by hand.
    pub fn validate(&self) -> Result<()> {
        if self.gateway_url().is_none() && self.mount_path().is_none() && !self.test_mode {
            return Err(MetricsError::configuration(
                "at least one output must be configured: set PUSH_GATEWAY_URL or METRICS_MOUNT_PATH",
            ));
        }

        if let Some(path) = self.mount_path() {
            validate_mount_path(path)?;
        }

        if let Some(gateway) = self.gateway_url() {
            validate_http_url("PUSH_GATEWAY_URL", gateway)?;
            require("PUSH_JOB_NAME", non_empty(&self.push_job_name))?;
            let frequency = require("PUSH_FREQUENCY", non_empty(&self.push_frequency))?;
            parse_duration("PUSH_FREQUENCY", frequency)?;
            let root = require("ROOT_URL", non_empty(&self.root_url))?;
            validate_http_url("ROOT_URL", root)?;
        } else if let Some(root) = non_empty(&self.root_url) {
            validate_http_url("ROOT_URL", root)?;
        }

        parse_duration("PUSH_TIMEOUT", &self.push_timeout)?;
        Ok(())
    }

    /// Resolved push settings, `None` when no gateway is configured.
    pub fn push_settings(&self) -> Result<Option<PushSettings>> {
        let Some(gateway) = self.gateway_url() else {
            return Ok(None);
        };

        let gateway_url = validate_http_url("PUSH_GATEWAY_URL", gateway)?;
        let job_name = require("PUSH_JOB_NAME", non_empty(&self.push_job_name))?.to_string();
        let interval = parse_duration(
            "PUSH_FREQUENCY",
            require("PUSH_FREQUENCY", non_empty(&self.push_frequency))?,
        )?;
        let timeout = parse_duration("PUSH_TIMEOUT", &self.push_timeout)?;
        let root_url = validate_http_url("ROOT_URL", require("ROOT_URL", non_empty(&self.root_url))?)?;
        let installation_domain = root_url
            .host_str()
            .ok_or_else(|| MetricsError::configuration("ROOT_URL has no host"))?
            .to_string();

        Ok(Some(PushSettings {
            gateway_url,
            job_name,
            interval,
            timeout,
            instance: identity::instance_name(self.worker_id()),
            installation_domain,
        }))
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format,
            file: non_empty(&self.log_file).map(str::to_string),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_duration(option: &str, value: &str) -> Result<Duration> {
    TimeParser::parse_duration(value)
        .map_err(|e| MetricsError::configuration(format!("{} = '{}': {}", option, value, e)))
}
