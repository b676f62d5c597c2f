//! Topology composition layer
//!
//! Ties the domain entities together into one immutable, validated
//! `Topology`, built by the staged `TopologyBuilder` and rendered as a
//! dependency-ordered `MaterializationPlan` for the external provisioning
//! engine.

pub mod builder;
pub mod graph;
pub mod plan;

pub use builder::{
    BridgeHandle, ListenerHandle, NetworkHandle, TargetGroupHandle, TopologyBuilder,
};
pub use graph::{DependencyGraph, ResourceKind, ResourceNode};
pub use plan::{MaterializationPlan, PlanStep};

use crate::config::AppConfig;
use crate::domain::bridge::PublicBridge;
use crate::domain::fabric::{derive_boundary, ConnectivityFabric, EndpointClass, InfraService};
use crate::domain::network::Network;
use crate::domain::routing::{InternalLoadBalancer, PathPattern, TargetGroup};
use crate::domain::workload::{ImageRef, TaskSpec, WorkloadCluster};
use crate::errors::{GangwayError, Result};
use serde::{Deserialize, Serialize};

/// The frozen topology: every provisioned entity, validated as a whole.
///
/// Effectively immutable between provisioning operations; the struct offers
/// no mutating methods once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub region: String,
    pub network: Network,
    pub fabric: ConnectivityFabric,
    pub load_balancer: InternalLoadBalancer,
    pub target_groups: Vec<TargetGroup>,
    pub cluster: WorkloadCluster,
    pub bridge: PublicBridge,
}

impl Topology {
    /// Build the standard topology described by the application
    /// configuration: two prioritized routes (`/` and `/customers`) backed
    /// by one task, a full connectivity fabric, and the public bridge.
    pub fn from_config(config: &AppConfig) -> Result<Topology> {
        config.validate()?;

        let mut builder = TopologyBuilder::new(&config.region);
        let network = builder.network(config.network_spec()?)?;
        builder.fabric(&network, &InfraService::standard_set())?;
        let listener =
            builder.routing(&network, &config.workload.cluster_name, config.routing.fallback)?;

        let group_a = builder.add_route(&listener, 1, &["/"], "group-a", "/")?;
        let group_b = builder.add_route(&listener, 2, &["/customers"], "group-b", "/")?;

        let image = ImageRef::parse(&config.workload.image_repository)?;
        let task = TaskSpec::new(
            image,
            config.workload.cpu,
            config.workload.memory_mib,
            &config.workload.log_prefix,
        );
        builder.workload(
            &network,
            &[group_a, group_b],
            &config.workload.cluster_name,
            &config.workload.service_name,
            task,
            config.workload.desired_count,
        )?;
        builder.bridge(&network, &listener, format!("{}-entry", config.workload.cluster_name))?;
        builder.finish()
    }

    /// Validate the assembled topology's structural invariants.
    ///
    /// The builder calls this from `finish`; it is also available to
    /// callers that deserialized a topology from elsewhere.
    pub fn validate(&self) -> Result<()> {
        // No egress path anywhere in the network boundary
        if self.network.has_internet_egress() {
            return Err(GangwayError::validation(
                "isolated topology must not contain an internet egress path",
            ));
        }

        // The fabric boundary must be exactly the derivation from the
        // current subnet layout, never an independently edited rule set
        let subnets: Vec<_> = self.network.isolated_subnets().into_iter().cloned().collect();
        let expected = derive_boundary(&subnets);
        if self.fabric.boundary.ingress != expected.ingress {
            return Err(GangwayError::validation(
                "fabric boundary ingress diverges from the subnet CIDR derivation",
            ));
        }

        // Every rule must reference a known target group
        for rule in self.load_balancer.listener.rules() {
            if !self.target_groups.iter().any(|g| g.id == rule.target_group) {
                return Err(GangwayError::not_found("target-group", rule.target_group.as_str()));
            }
        }

        // The load balancer and all replicas live in the network's subnets
        for subnet_id in &self.load_balancer.subnet_ids {
            if self.network.subnet(subnet_id).is_none() {
                return Err(GangwayError::not_found("subnet", subnet_id.as_str()));
            }
        }
        for service in &self.cluster.services {
            for replica in service.replicas() {
                if self.network.subnet(&replica.subnet_id).is_none() {
                    return Err(GangwayError::validation(format!(
                        "replica {} placed outside the network's subnets",
                        replica.id
                    )));
                }
            }
        }

        // The bridge forwards to this topology's listener, wildcard-any
        if self.bridge.link.listener_id != self.load_balancer.listener.id {
            return Err(GangwayError::dependency_order("bridge", "this topology's listener"));
        }
        if self.bridge.routes.len() != 1
            || self.bridge.routes[0].pattern != PathPattern::Any
        {
            return Err(GangwayError::validation(
                "public bridge must declare exactly one wildcard route",
            ));
        }

        Ok(())
    }

    /// The explicit dependency graph of materialization steps
    pub fn graph(&self) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();

        graph.add(self.network.name.clone(), ResourceKind::Network, vec![])?;
        for subnet in &self.network.subnets {
            graph.add(
                subnet.name.clone(),
                ResourceKind::Subnet,
                vec![self.network.name.clone()],
            )?;
        }
        let subnet_names: Vec<String> =
            self.network.subnets.iter().map(|s| s.name.clone()).collect();

        graph.add(
            self.fabric.boundary.name.clone(),
            ResourceKind::SecurityBoundary,
            subnet_names.clone(),
        )?;
        for endpoint in &self.fabric.endpoints {
            let mut deps = subnet_names.clone();
            if endpoint.class == EndpointClass::Interface {
                deps.push(self.fabric.boundary.name.clone());
            }
            graph.add(
                format!("endpoint-{}", endpoint.service.short_name()),
                ResourceKind::ServiceEndpoint,
                deps,
            )?;
        }

        let lb_name = format!("{}-lb", self.load_balancer.name);
        graph.add(
            self.load_balancer.boundary.name.clone(),
            ResourceKind::SecurityBoundary,
            vec![self.network.name.clone()],
        )?;
        let mut lb_deps = subnet_names.clone();
        lb_deps.push(self.load_balancer.boundary.name.clone());
        graph.add(lb_name.clone(), ResourceKind::LoadBalancer, lb_deps)?;

        let listener_name = format!("{}-listener", self.load_balancer.name);
        graph.add(listener_name.clone(), ResourceKind::Listener, vec![lb_name])?;

        for group in &self.target_groups {
            graph.add(
                group.name.clone(),
                ResourceKind::TargetGroup,
                vec![self.network.name.clone()],
            )?;
        }
        for rule in self.load_balancer.listener.rules() {
            let group_name = self
                .target_groups
                .iter()
                .find(|g| g.id == rule.target_group)
                .map(|g| g.name.clone())
                .ok_or_else(|| {
                    GangwayError::not_found("target-group", rule.target_group.as_str())
                })?;
            graph.add(
                format!("rule-{}", rule.priority),
                ResourceKind::RoutingRule,
                vec![listener_name.clone(), group_name],
            )?;
        }

        let cluster_name = format!("cluster-{}", self.cluster.name);
        graph.add(cluster_name.clone(), ResourceKind::WorkloadCluster, vec![])?;
        let endpoint_names: Vec<String> = self
            .fabric
            .endpoints
            .iter()
            .map(|e| format!("endpoint-{}", e.service.short_name()))
            .collect();
        for service in &self.cluster.services {
            let mut deps = vec![cluster_name.clone()];
            deps.extend(endpoint_names.iter().cloned());
            deps.extend(
                self.target_groups
                    .iter()
                    .filter(|g| service.target_groups.contains(&g.id))
                    .map(|g| g.name.clone()),
            );
            graph.add(
                format!("service-{}", service.name),
                ResourceKind::WorkloadService,
                deps,
            )?;
        }

        let mut link_deps = subnet_names;
        link_deps.push(listener_name);
        // Rules must be in place before public traffic can arrive
        for rule in self.load_balancer.listener.rules() {
            link_deps.push(format!("rule-{}", rule.priority));
        }
        graph.add(self.bridge.link.name.clone(), ResourceKind::PrivateLink, link_deps)?;
        for route in &self.bridge.routes {
            graph.add(
                format!("route-{}", route.route_key()),
                ResourceKind::BridgeRoute,
                vec![self.bridge.link.name.clone()],
            )?;
        }

        Ok(graph)
    }

    /// Render the dependency-ordered materialization plan
    pub fn plan(&self) -> Result<MaterializationPlan> {
        MaterializationPlan::from_topology(self)
    }
}
