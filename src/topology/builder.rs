//! Staged topology builder
//!
//! Construction is a synchronous, single-threaded composition of a
//! declarative object graph. Each stage returns a typed handle that later
//! stages take by reference, so "listener must exist before bridge" is a
//! precondition the compiler and the builder check, not an accident of
//! statement order. `finish` validates the whole topology and freezes it;
//! no partially built `Topology` ever escapes.

use crate::domain::bridge::PublicBridge;
use crate::domain::fabric::{ConnectivityFabric, InfraService};
use crate::domain::id::{LinkId, ListenerId, NetworkId, SubnetId, TargetGroupId};
use crate::domain::network::{Network, NetworkSpec};
use crate::domain::routing::{
    FallbackPolicy, InternalLoadBalancer, PathPattern, TargetGroup,
};
use crate::domain::workload::{TaskSpec, WorkloadCluster, WorkloadService};
use crate::errors::{GangwayError, Result};
use crate::topology::Topology;
use tracing::info;

/// Proof that the network boundary has been established
#[derive(Debug, Clone)]
pub struct NetworkHandle {
    pub network_id: NetworkId,
    pub subnet_ids: Vec<SubnetId>,
}

/// Proof that the routing layer exists with its default action configured
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    pub listener_id: ListenerId,
}

/// Proof that a target group exists behind a routing rule
#[derive(Debug, Clone)]
pub struct TargetGroupHandle {
    pub target_group_id: TargetGroupId,
    pub name: String,
}

/// Proof that the public bridge has been linked to the listener
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    pub link_id: LinkId,
}

/// Dependency-ordered builder for the private topology
#[derive(Debug)]
pub struct TopologyBuilder {
    region: String,
    network: Option<Network>,
    fabric: Option<ConnectivityFabric>,
    load_balancer: Option<InternalLoadBalancer>,
    target_groups: Vec<TargetGroup>,
    cluster: Option<WorkloadCluster>,
    bridge: Option<PublicBridge>,
}

impl TopologyBuilder {
    /// Start a build for the given region
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            network: None,
            fabric: None,
            load_balancer: None,
            target_groups: Vec::new(),
            cluster: None,
            bridge: None,
        }
    }

    /// Stage 1: establish the network boundary
    pub fn network(&mut self, spec: NetworkSpec) -> Result<NetworkHandle> {
        if self.network.is_some() {
            return Err(GangwayError::conflict(
                "network boundary already established",
                "network",
            ));
        }
        let network = spec.build(&self.region)?;
        let handle = NetworkHandle {
            network_id: network.id.clone(),
            subnet_ids: network.subnets.iter().map(|s| s.id.clone()).collect(),
        };
        info!(
            network = %network.name,
            cidr = %network.cidr,
            subnets = network.subnets.len(),
            "Network boundary established"
        );
        self.network = Some(network);
        Ok(handle)
    }

    /// Stage 2a: provision the connectivity fabric over the network
    pub fn fabric(
        &mut self,
        network: &NetworkHandle,
        services: &[InfraService],
    ) -> Result<()> {
        let net = self.checked_network(network)?;
        if self.fabric.is_some() {
            return Err(GangwayError::conflict(
                "connectivity fabric already provisioned",
                "fabric",
            ));
        }
        let subnets: Vec<_> = net.isolated_subnets().into_iter().cloned().collect();
        let fabric = ConnectivityFabric::build(&self.region, services, &subnets)?;
        info!(
            endpoints = fabric.endpoints.len(),
            boundary_rules = fabric.boundary.ingress.len(),
            "Connectivity fabric provisioned"
        );
        self.fabric = Some(fabric);
        Ok(())
    }

    /// Stage 2b: create the internal routing layer (load balancer, port-80
    /// listener, default action)
    pub fn routing(
        &mut self,
        network: &NetworkHandle,
        name: impl Into<String>,
        fallback: FallbackPolicy,
    ) -> Result<ListenerHandle> {
        self.checked_network(network)?;
        if self.load_balancer.is_some() {
            return Err(GangwayError::conflict("routing layer already created", "load-balancer"));
        }
        let lb = InternalLoadBalancer::new(name, network.subnet_ids.clone(), fallback)?;
        let handle = ListenerHandle { listener_id: lb.listener.id.clone() };
        info!(load_balancer = %lb.name, port = lb.listener.port, "Internal routing layer created");
        self.load_balancer = Some(lb);
        Ok(handle)
    }

    /// Add a prioritized routing rule backed by a fresh target group.
    ///
    /// Fails on a duplicate priority before anything is recorded.
    pub fn add_route(
        &mut self,
        listener: &ListenerHandle,
        priority: u32,
        patterns: &[&str],
        group_name: impl Into<String>,
        health_check_path: impl Into<String>,
    ) -> Result<TargetGroupHandle> {
        let health_check_path = health_check_path.into();
        let group_name = group_name.into();

        let parsed: Vec<PathPattern> =
            patterns.iter().map(|p| PathPattern::parse(p)).collect::<Result<_>>()?;
        let group = TargetGroup::new(group_name.clone(), 80, health_check_path.clone());
        let group_id = group.id.clone();

        let lb = self.checked_listener(listener)?;
        lb.listener.add_rule(priority, parsed, group_id.clone(), health_check_path)?;
        self.target_groups.push(group);

        info!(priority, group = %group_name, "Routing rule added");
        Ok(TargetGroupHandle { target_group_id: group_id, name: group_name })
    }

    /// Stage 3: create the compute workload and register its replicas in
    /// the given target groups
    pub fn workload(
        &mut self,
        network: &NetworkHandle,
        groups: &[TargetGroupHandle],
        cluster_name: impl Into<String>,
        service_name: impl Into<String>,
        task: TaskSpec,
        desired_count: u32,
    ) -> Result<()> {
        if self.cluster.is_some() {
            return Err(GangwayError::conflict("compute workload already created", "workload"));
        }
        if self.fabric.is_none() {
            // Without the fabric the replicas could neither pull their image
            // nor deliver logs, so this is an ordering error, not a warning.
            return Err(GangwayError::dependency_order("workload", "connectivity fabric"));
        }
        for group in groups {
            if !self.target_groups.iter().any(|g| g.id == group.target_group_id) {
                return Err(GangwayError::not_found(
                    "target-group",
                    group.target_group_id.as_str(),
                ));
            }
        }

        let subnets: Vec<_> = {
            let net = self.checked_network(network)?;
            net.isolated_subnets().into_iter().cloned().collect()
        };

        let group_ids: Vec<TargetGroupId> =
            groups.iter().map(|g| g.target_group_id.clone()).collect();
        let mut service = WorkloadService::new(service_name, task, group_ids)?;
        service.set_desired_count(desired_count, &subnets)?;

        for replica in service.replicas() {
            for group in &mut self.target_groups {
                if service.target_groups.contains(&group.id) {
                    group.register(replica.id.clone());
                }
            }
        }

        let mut cluster = WorkloadCluster::new(cluster_name);
        info!(
            service = %service.name,
            desired_count,
            zones = ?service.zones_covered(),
            "Compute workload created"
        );
        cluster.add_service(service);
        self.cluster = Some(cluster);
        Ok(())
    }

    /// Stage 4: bridge the public front door into the internal listener.
    ///
    /// The handle proves the listener exists; the builder additionally
    /// verifies it still belongs to this build.
    pub fn bridge(
        &mut self,
        network: &NetworkHandle,
        listener: &ListenerHandle,
        name: impl Into<String>,
    ) -> Result<BridgeHandle> {
        if self.bridge.is_some() {
            return Err(GangwayError::conflict("public bridge already linked", "bridge"));
        }
        self.checked_listener(listener)?;
        self.checked_network(network)?;
        let bridge = PublicBridge::build(
            name,
            network.subnet_ids.clone(),
            listener.listener_id.clone(),
        )?;
        let handle = BridgeHandle { link_id: bridge.link.id.clone() };
        info!(link = %bridge.link.name, route = %bridge.routes[0].route_key(), "Public bridge linked");
        self.bridge = Some(bridge);
        Ok(handle)
    }

    /// Freeze the topology. Every stage must have run; the assembled
    /// topology is validated as a whole before being returned.
    pub fn finish(self) -> Result<Topology> {
        let network = self
            .network
            .ok_or_else(|| GangwayError::dependency_order("topology", "network boundary"))?;
        let fabric = self
            .fabric
            .ok_or_else(|| GangwayError::dependency_order("topology", "connectivity fabric"))?;
        let load_balancer = self
            .load_balancer
            .ok_or_else(|| GangwayError::dependency_order("topology", "routing layer"))?;
        let cluster = self
            .cluster
            .ok_or_else(|| GangwayError::dependency_order("topology", "compute workload"))?;
        let bridge = self
            .bridge
            .ok_or_else(|| GangwayError::dependency_order("topology", "public bridge"))?;

        let topology = Topology {
            region: self.region,
            network,
            fabric,
            load_balancer,
            target_groups: self.target_groups,
            cluster,
            bridge,
        };
        topology.validate()?;
        info!(region = %topology.region, "Topology frozen and validated");
        Ok(topology)
    }

    fn checked_network(&self, handle: &NetworkHandle) -> Result<&Network> {
        match &self.network {
            Some(network) if network.id == handle.network_id => Ok(network),
            Some(_) => {
                Err(GangwayError::not_found("network", handle.network_id.as_str()))
            }
            None => Err(GangwayError::dependency_order("stage", "network boundary")),
        }
    }

    fn checked_listener(&mut self, handle: &ListenerHandle) -> Result<&mut InternalLoadBalancer> {
        match &mut self.load_balancer {
            Some(lb) if lb.listener.id == handle.listener_id => Ok(lb),
            Some(_) => Err(GangwayError::not_found("listener", handle.listener_id.as_str())),
            None => Err(GangwayError::dependency_order("stage", "routing layer")),
        }
    }
}
