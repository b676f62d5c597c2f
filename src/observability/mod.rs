//! # Observability Infrastructure
//!
//! Structured logging for the topology core. The core runs once and exits,
//! so observability here means a well-configured `tracing` subscriber and a
//! startup configuration log, not metrics servers or trace exporters.

pub mod logging;

pub use logging::{init_tracing, log_config_info};
