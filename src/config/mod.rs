//! # Configuration Management
//!
//! Environment-driven settings for the topology core. All knobs the
//! operator supplies (region, address space, zone count, image reference,
//! desired replica count, fallback policy) enter through here and are
//! validated before any construction begins.

pub mod settings;

pub use settings::{
    AppConfig, NetworkSettings, ObservabilityConfig, RoutingSettings, WorkloadSettings,
};
