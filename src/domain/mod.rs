//! Domain layer
//!
//! This module contains pure domain entities and business logic with zero
//! infrastructure dependencies. Domain types represent the core concepts of
//! the private topology: the network boundary, the connectivity fabric, the
//! internal routing layer, the compute workload, and the public bridge.
//!
//! ## Module Organization
//!
//! - `id`: Type-safe domain identifiers with NewType pattern
//! - `network`: Address space, subnets, and security boundaries
//! - `fabric`: Private endpoints to named infrastructure services
//! - `routing`: Internal load balancer, listener, and prioritized rules
//! - `workload`: Task specification, replicas, and scaling
//! - `bridge`: Private link and public route definitions

pub mod bridge;
pub mod fabric;
pub mod id;
pub mod network;
pub mod routing;
pub mod workload;

// Re-export main types from each module
pub use bridge::{BridgeRoute, MethodSet, PrivateLink, PublicBridge};
pub use fabric::{ConnectivityFabric, EndpointClass, InfraService, ServiceEndpoint};
pub use id::{
    BoundaryId, EndpointId, LinkId, ListenerId, NetworkId, ReplicaId, SubnetId, TargetGroupId,
};
pub use network::{
    IngressRule, Network, NetworkSpec, Protocol, RuleSource, SecurityBoundary, Subnet, Visibility,
};
pub use routing::{
    FallbackPolicy, FixedResponse, InternalLoadBalancer, Listener, PathPattern, RouteDecision,
    RoutingRule, TargetGroup,
};
pub use workload::{ImageRef, Replica, TaskSpec, WorkloadCluster, WorkloadService};
