//! # Configuration Settings
//!
//! Defines the configuration structure for the Gangway topology core.
//! Settings load from the environment (prefix `GANGWAY_`, `__` as the
//! section separator) with an optional YAML/TOML file underneath, and are
//! validated with the `validator` derive plus custom cross-field checks
//! before any topology construction starts.

use crate::domain::network::NetworkSpec;
use crate::domain::routing::FallbackPolicy;
use crate::errors::{GangwayError, Result};
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Region qualifying infrastructure-service identifiers and zone names
    #[validate(length(min = 1, message = "Region cannot be empty"))]
    pub region: String,

    /// Network boundary configuration
    #[validate(nested)]
    pub network: NetworkSettings,

    /// Routing layer configuration
    pub routing: RoutingSettings,

    /// Compute workload configuration
    #[validate(nested)]
    pub workload: WorkloadSettings,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            network: NetworkSettings::default(),
            routing: RoutingSettings::default(),
            workload: WorkloadSettings::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment, optionally layered on a
    /// config file named by `GANGWAY_CONFIG_FILE`.
    pub fn from_env() -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var("GANGWAY_CONFIG_FILE") {
            builder = builder.add_source(config::File::with_name(&path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("GANGWAY").separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(GangwayError::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        // The CIDR must parse; zone-count feasibility against the
        // environment is checked again when the network is built
        self.parsed_cidr()?;

        if self.network.zone_count == 0 {
            return Err(GangwayError::validation("Zone count must be at least 1"));
        }

        Ok(())
    }

    /// The network spec this configuration describes
    pub fn network_spec(&self) -> Result<NetworkSpec> {
        Ok(NetworkSpec::new(
            format!("{}-network", self.workload.cluster_name),
            self.parsed_cidr()?,
            self.network.zone_count,
        )
        .with_max_zones(self.network.max_zones_available))
    }

    fn parsed_cidr(&self) -> Result<Ipv4Network> {
        self.network
            .cidr
            .parse::<Ipv4Network>()
            .map_err(|e| GangwayError::validation_field(e.to_string(), "network.cidr"))
    }
}

/// Network boundary configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NetworkSettings {
    /// Address space to partition into isolated subnets
    #[validate(length(min = 9, message = "CIDR must be a full a.b.c.d/n block"))]
    pub cidr: String,

    /// Availability zones to replicate subnets across
    #[validate(range(min = 1, max = 26, message = "Zone count must be between 1 and 26"))]
    pub zone_count: u8,

    /// Zones available in the target environment
    #[validate(range(min = 1, max = 26, message = "Zone availability must be between 1 and 26"))]
    pub max_zones_available: u8,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self { cidr: "10.0.0.0/16".to_string(), zone_count: 2, max_zones_available: 3 }
    }
}

/// Routing layer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoutingSettings {
    /// Policy for paths no rule matches
    pub fallback: FallbackPolicy,
}

/// Compute workload configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WorkloadSettings {
    /// Cluster name, reused as the topology naming prefix
    #[validate(length(min = 1, message = "Cluster name cannot be empty"))]
    pub cluster_name: String,

    /// Service name within the cluster
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Pre-existing container-image repository, by name
    #[validate(length(min = 1, message = "Image repository cannot be empty"))]
    pub image_repository: String,

    /// Desired replica count
    #[validate(range(max = 100, message = "Desired count must be at most 100"))]
    pub desired_count: u32,

    /// CPU units per replica
    #[validate(range(min = 1, message = "CPU units must be positive"))]
    pub cpu: u32,

    /// Memory limit per replica in MiB
    #[validate(range(min = 1, message = "Memory limit must be positive"))]
    pub memory_mib: u32,

    /// Log destination name prefix
    #[validate(length(min = 1, message = "Log prefix cannot be empty"))]
    pub log_prefix: String,
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            cluster_name: "backend".to_string(),
            service_name: "api".to_string(),
            image_repository: "backend/api".to_string(),
            desired_count: 2,
            cpu: 256,
            memory_mib: 512,
            log_prefix: "backend".to_string(),
        }
    }
}

/// Observability configuration for structured logging
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Logging service name
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false, service_name: "gangway".to_string() }
    }
}
