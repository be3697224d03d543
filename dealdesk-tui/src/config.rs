//! Configuration loading for the DealDesk TUI.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use dealdesk_core::{ControllerConfig, DeskError, OrganizationId, PageSizes, SessionContext};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub organization_id: OrganizationId,
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    pub tick_rate_ms: u64,
    pub log_path: PathBuf,
    pub log_level: String,
    pub theme: ThemeConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub jwt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub page_sizes: Vec<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or DEALDESK_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<DeskError> for ConfigError {
    fn from(err: DeskError) -> Self {
        match err {
            DeskError::InvalidValue { field, reason } => ConfigError::InvalidValue { field, reason },
            other => ConfigError::InvalidValue {
                field: "config",
                reason: other.to_string(),
            },
        }
    }
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: TuiConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if is_blank(&self.auth.api_key) && is_blank(&self.auth.jwt) {
            return Err(ConfigError::InvalidValue {
                field: "auth",
                reason: "api_key or jwt must be provided".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_rate_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_path",
                reason: "must not be empty".to_string(),
            });
        }
        if let Err(err) = EnvFilter::try_new(&self.log_level) {
            return Err(ConfigError::InvalidValue {
                field: "log_level",
                reason: err.to_string(),
            });
        }
        if self.theme.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.theme.name.to_ascii_lowercase() != "synthbrute" {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: "only 'synthbrute' is supported".to_string(),
            });
        }
        let page_sizes = self.page_sizes()?;
        if !page_sizes.contains(self.pagination.default_page_size) {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_page_size",
                reason: format!("must be one of {:?}", page_sizes.as_slice()),
            });
        }
        Ok(())
    }

    pub fn page_sizes(&self) -> Result<PageSizes, ConfigError> {
        PageSizes::new(self.pagination.page_sizes.clone()).map_err(|err| match err {
            DeskError::InvalidValue { reason, .. } => ConfigError::InvalidValue {
                field: "pagination.page_sizes",
                reason,
            },
            other => other.into(),
        })
    }

    /// Controller settings shared by every list screen.
    pub fn controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        Ok(ControllerConfig::default()
            .with_page_sizes(self.pagination.default_page_size, self.page_sizes()?))
    }

    /// The explicit request context every backend call carries.
    pub fn session(&self) -> Result<SessionContext, ConfigError> {
        Ok(SessionContext::new(
            self.organization_id,
            self.auth.api_key.clone(),
            self.auth.jwt.clone(),
        )?)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("DEALDESK_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
