//! # Gangway
//!
//! Gangway is a one-shot topology-construction core: it provisions and
//! wires a private network topology that exposes a containerized backend
//! service through a managed public HTTP entry point, without any component
//! of the backend ever being reachable from, or reaching out to, the public
//! internet directly.
//!
//! ## Architecture
//!
//! The build is a staged, dependency-ordered composition:
//!
//! ```text
//! Network Boundary → Connectivity Fabric ─┐
//!        │                                 │
//!        └→ Internal Routing Layer → Compute Workload
//!                    │
//!                    └→ Public Bridge
//! ```
//!
//! ## Core Components
//!
//! - **Network Boundary**: isolated address space, zone-replicated subnets,
//!   no NAT egress by construction
//! - **Connectivity Fabric**: private endpoints to the image registry, log
//!   sink, and object store, bounded to the subnets' own CIDRs
//! - **Internal Routing Layer**: internal load balancer with prioritized
//!   path rules and an explicit fallback action
//! - **Compute Workload**: scaled replica set registered across target
//!   groups
//! - **Public Bridge**: private link forwarding `ANY /{proxy+}` into the
//!   internal listener, method and path unmodified
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gangway::{AppConfig, Result, Topology};
//!
//! fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let topology = Topology::from_config(&config)?;
//!     println!("{}", topology.plan()?.to_json()?);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod topology;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{GangwayError, Result};
pub use observability::init_tracing;
pub use topology::{MaterializationPlan, Topology, TopologyBuilder};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
