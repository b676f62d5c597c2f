//! Integration tests for the full topology build
//!
//! These tests exercise the public API end to end: configuration in,
//! validated topology and dependency-ordered plan out, with the routing,
//! isolation, and stability properties the topology must uphold.

use gangway::domain::{
    EndpointClass, FallbackPolicy, ImageRef, InfraService, NetworkSpec, Protocol, RouteDecision,
    RuleSource, TargetGroupId, TaskSpec, WorkloadService,
};
use gangway::topology::ResourceKind;
use gangway::{AppConfig, GangwayError, Topology, TopologyBuilder};
use tracing_test::traced_test;

fn default_topology() -> Topology {
    Topology::from_config(&AppConfig::default()).expect("default config builds")
}

fn group_id(topology: &Topology, name: &str) -> TargetGroupId {
    topology
        .target_groups
        .iter()
        .find(|g| g.name == name)
        .map(|g| g.id.clone())
        .unwrap_or_else(|| panic!("target group '{}' exists", name))
}

/// Priorities are pairwise distinct; a duplicate fails before any resource
/// is created.
#[test]
fn duplicate_priority_fails_before_any_resource() {
    let mut builder = TopologyBuilder::new("us-east-1");
    let network =
        builder.network(NetworkSpec::new("backend", "10.0.0.0/16".parse().unwrap(), 2)).unwrap();
    let listener = builder.routing(&network, "backend", FallbackPolicy::default()).unwrap();
    builder.add_route(&listener, 1, &["/"], "group-a", "/").unwrap();

    let err = builder.add_route(&listener, 1, &["/dup"], "group-dup", "/").unwrap_err();
    assert!(matches!(err, GangwayError::Conflict { .. }));
}

/// Requests route per the declared priorities: `/` to group A,
/// `/customers` and its sub-paths to group B, unmatched paths to the
/// fixed 200 response.
#[test]
fn request_paths_route_to_declared_groups() {
    let topology = default_topology();
    let listener = &topology.load_balancer.listener;
    let group_a = group_id(&topology, "group-a");
    let group_b = group_id(&topology, "group-b");

    assert_eq!(
        listener.resolve("/"),
        RouteDecision::Forward { target_group: group_a, priority: 1 }
    );
    assert_eq!(
        listener.resolve("/customers"),
        RouteDecision::Forward { target_group: group_b.clone(), priority: 2 }
    );
    assert_eq!(
        listener.resolve("/customers/42"),
        RouteDecision::Forward { target_group: group_b, priority: 2 }
    );

    match listener.resolve("/unmatched/path") {
        RouteDecision::Fixed(response) => {
            assert_eq!(response.status, 200);
            assert_eq!(response.body, "No routes defined");
        }
        other => panic!("expected the fallback response, got {:?}", other),
    }
}

/// Isolation is structural: no subnet has an internet route, and no NAT
/// gateway resource exists anywhere in the topology or its plan.
#[test]
fn isolation_is_structural() {
    let topology = default_topology();
    assert!(!topology.network.has_internet_egress());

    let rendered = serde_json::to_string(&topology).unwrap().to_lowercase();
    assert!(!rendered.contains("nat"), "no NAT resource may appear in the topology");

    let plan = topology.plan().unwrap();
    for step in &plan.steps {
        assert!(!step.resource.to_lowercase().contains("nat"));
    }
}

/// The fabric boundary's ingress sources are exactly the isolated-subnet
/// CIDRs, and re-deriving from a rebuilt network yields the same rule set.
#[test]
fn fabric_boundary_matches_subnet_cidrs_deterministically() {
    let first = default_topology();
    let second = default_topology();

    let cidrs: Vec<_> = first.network.isolated_subnets().iter().map(|s| s.cidr).collect();
    assert_eq!(first.fabric.boundary.cidr_sources(), cidrs);
    assert!(first.fabric.boundary.ingress.iter().all(|r| r.port == 443));

    // IDs differ between builds; the derived rule content does not
    assert_eq!(first.fabric.boundary.ingress, second.fabric.boundary.ingress);
}

/// Interface endpoints carry the boundary and DNS override; the object
/// store attaches as a gateway without either.
#[test]
fn endpoint_classes_follow_their_services() {
    let topology = default_topology();
    for endpoint in &topology.fabric.endpoints {
        match endpoint.service {
            InfraService::ObjectStore => {
                assert_eq!(endpoint.class, EndpointClass::Gateway);
                assert!(endpoint.security_boundary.is_none());
                assert!(!endpoint.private_dns);
            }
            _ => {
                assert_eq!(endpoint.class, EndpointClass::Interface);
                assert!(endpoint.security_boundary.is_some());
                assert!(endpoint.private_dns);
            }
        }
    }
}

/// The bridge declares exactly `ANY /{proxy+}` and forwards method and
/// full sub-path unmodified.
#[test]
fn bridge_route_is_wildcard_any_and_preserves_requests() {
    let topology = default_topology();
    assert_eq!(topology.bridge.routes.len(), 1);
    assert_eq!(topology.bridge.routes[0].route_key(), "ANY /{proxy+}");

    assert_eq!(
        topology.bridge.forward("POST", "/customers/42"),
        Some(("POST", "/customers/42"))
    );
    assert_eq!(topology.bridge.forward("GET", "/"), Some(("GET", "/")));
}

/// Scaling desired count 2 -> 0 -> 2 leaves rule priorities and
/// target-group identities unchanged.
#[test]
fn topology_is_stable_under_workload_scaling() {
    let subnets = NetworkSpec::new("backend", "10.0.0.0/16".parse().unwrap(), 2)
        .build("us-east-1")
        .unwrap()
        .subnets;

    let task = TaskSpec::new(ImageRef::parse("backend/api").unwrap(), 256, 512, "backend");
    let groups = vec![TargetGroupId::new(), TargetGroupId::new()];
    let mut service = WorkloadService::new("api", task, groups.clone()).unwrap();

    service.set_desired_count(2, &subnets).unwrap();
    service.set_desired_count(0, &subnets).unwrap();
    service.set_desired_count(2, &subnets).unwrap();

    assert_eq!(service.target_groups, groups);
    assert_eq!(service.replicas().len(), 2);
}

/// End-to-end scenario: desired count 2, zone count 2 -> two replicas
/// across two zones, each registered in both target groups, all inside
/// the isolated subnets.
#[test]
fn end_to_end_two_replicas_two_zones() {
    let topology = default_topology();
    let service = &topology.cluster.services[0];

    assert_eq!(service.replicas().len(), 2);
    assert_eq!(service.zones_covered().len(), 2);

    let subnet_ids: Vec<_> =
        topology.network.isolated_subnets().iter().map(|s| s.id.clone()).collect();
    for replica in service.replicas() {
        assert!(subnet_ids.contains(&replica.subnet_id));
        assert_eq!(replica.container_port, 80);
        assert_eq!(replica.protocol, Protocol::Tcp);
    }

    for group in &topology.target_groups {
        for replica in service.replicas() {
            assert!(
                group.members.contains(&replica.id),
                "replica {} must be registered in group {}",
                replica.id,
                group.name
            );
        }
    }
}

/// The plan applies the network first, the listener before the private
/// link, and every dependency before its dependent.
#[test]
fn plan_is_dependency_ordered() {
    let plan = default_topology().plan().unwrap();

    assert_eq!(plan.steps[0].kind, ResourceKind::Network);
    for step in &plan.steps {
        for dep in &step.depends_on {
            let dep_pos = plan.position(dep).expect("declared dependency is a step");
            assert!(dep_pos + 1 < step.order, "'{}' must precede '{}'", dep, step.resource);
        }
    }

    let listener = plan.steps.iter().find(|s| s.kind == ResourceKind::Listener).unwrap();
    let link = plan.steps.iter().find(|s| s.kind == ResourceKind::PrivateLink).unwrap();
    assert!(listener.order < link.order);
}

/// The listener boundary admits HTTP from anywhere; the fabric boundary
/// admits HTTPS from the subnets only.
#[test]
fn security_boundaries_match_their_roles() {
    let topology = default_topology();

    let listener_rules = &topology.load_balancer.boundary.ingress;
    assert_eq!(listener_rules.len(), 1);
    assert_eq!(listener_rules[0].port, 80);
    assert_eq!(listener_rules[0].source, RuleSource::AnyIpv4);

    for rule in &topology.fabric.boundary.ingress {
        assert_eq!(rule.port, 443);
        assert!(matches!(rule.source, RuleSource::Cidr(_)));
    }
}

/// Zone count over environment availability aborts the build with a
/// configuration error.
#[test]
fn zone_count_over_availability_aborts_the_build() {
    let mut config = AppConfig::default();
    config.network.zone_count = 5;
    config.network.max_zones_available = 3;

    let err = Topology::from_config(&config).unwrap_err();
    assert!(err.is_configuration());
}

/// A malformed image repository reference aborts the build before any
/// plan exists.
#[test]
fn malformed_image_reference_aborts_the_build() {
    let mut config = AppConfig::default();
    config.workload.image_repository = "Not A Repo".to_string();

    let err = Topology::from_config(&config).unwrap_err();
    assert!(err.is_configuration());
}

/// Every build stage announces itself, so a one-shot run leaves a usable
/// provisioning trace.
#[traced_test]
#[test]
fn build_logs_every_stage() {
    let _ = default_topology();

    assert!(logs_contain("Network boundary established"));
    assert!(logs_contain("Connectivity fabric provisioned"));
    assert!(logs_contain("Internal routing layer created"));
    assert!(logs_contain("Compute workload created"));
    assert!(logs_contain("Public bridge linked"));
    assert!(logs_contain("Topology frozen and validated"));
}

/// The strict fallback policy flows from configuration to the listener.
#[test]
fn configured_fallback_policy_is_honored() {
    let mut config = AppConfig::default();
    config.routing.fallback = FallbackPolicy::NotFound;

    let topology = Topology::from_config(&config).unwrap();
    match topology.load_balancer.listener.resolve("/unmatched") {
        RouteDecision::Fixed(response) => assert_eq!(response.status, 404),
        other => panic!("expected a fixed response, got {:?}", other),
    }
}
