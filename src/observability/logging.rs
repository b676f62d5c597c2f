//! # Structured Logging
//!
//! Provides structured logging setup using the tracing ecosystem. The
//! subscriber honors `RUST_LOG` when set, falling back to the configured
//! log level, and can emit JSON for machine-consumed provisioning logs.

use crate::config::ObservabilityConfig;
use crate::errors::{GangwayError, Result};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Safe to call once per process; a second call reports an internal error
/// rather than silently replacing the subscriber.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let result = if config.json_logging {
        tracing_subscriber::fmt().with_env_filter(filter).json().with_target(true).try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init()
    };

    result.map_err(|e| GangwayError::internal(format!("failed to set tracing subscriber: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        region = %config.region,
        cidr = %config.network.cidr,
        zone_count = config.network.zone_count,
        desired_count = config.workload.desired_count,
        image_repository = %config.workload.image_repository,
        fallback = ?config.routing.fallback,
        "Gangway topology configuration"
    );
}
