//! Log initialisation.
//!
//! The terminal belongs to the UI, so logs go to the configured file.

use crate::config::TuiConfig;
use crate::error::TuiError;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured log filter.
pub const LOG_ENV: &str = "DEALDESK_LOG";

/// Filter from `DEALDESK_LOG`, falling back to the configured level.
pub fn env_filter(config: &TuiConfig) -> Result<EnvFilter, TuiError> {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TuiError::Logging(e.to_string()))
}

pub fn init(config: &TuiConfig) -> Result<(), TuiError> {
    if let Some(parent) = config.log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config)?)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| TuiError::Logging(e.to_string()))?;

    tracing::info!(
        api_base_url = %config.api_base_url,
        organization_id = %config.organization_id,
        log_path = %config.log_path.display(),
        "DealDesk TUI starting"
    );
    Ok(())
}
