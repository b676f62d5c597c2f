//! Connectivity-fabric domain types
//!
//! Private service endpoints granting the isolated subnets access to named
//! infrastructure services (image registry, log delivery, object storage)
//! without traversing the public internet. Interface-class endpoints attach
//! at the network-interface level behind a shared security boundary;
//! gateway-class endpoints attach at the route-table level and need none.

use crate::domain::id::{BoundaryId, EndpointId, SubnetId};
use crate::domain::network::{Protocol, RuleSource, SecurityBoundary, Subnet};
use crate::errors::{GangwayError, Result};
use serde::{Deserialize, Serialize};

/// Named infrastructure services the fabric can reach privately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InfraService {
    /// Container image layer pulls
    RegistryDocker,

    /// Registry control-plane calls (auth, manifests)
    RegistryApi,

    /// Log delivery
    LogSink,

    /// Object storage (image layers are fetched from here)
    ObjectStore,
}

impl InfraService {
    /// All services the standard fabric provisions
    pub fn standard_set() -> Vec<InfraService> {
        vec![
            InfraService::RegistryDocker,
            InfraService::RegistryApi,
            InfraService::LogSink,
            InfraService::ObjectStore,
        ]
    }

    /// How this service's endpoint attaches to the network
    pub fn endpoint_class(&self) -> EndpointClass {
        match self {
            InfraService::ObjectStore => EndpointClass::Gateway,
            _ => EndpointClass::Interface,
        }
    }

    /// Region-qualified service identifier
    pub fn service_name(&self, region: &str) -> String {
        let suffix = match self {
            InfraService::RegistryDocker => "ecr.dkr",
            InfraService::RegistryApi => "ecr.api",
            InfraService::LogSink => "logs",
            InfraService::ObjectStore => "s3",
        };
        format!("com.amazonaws.{}.{}", region, suffix)
    }

    /// Short name used in resource naming and the plan
    pub fn short_name(&self) -> &'static str {
        match self {
            InfraService::RegistryDocker => "registry-docker",
            InfraService::RegistryApi => "registry-api",
            InfraService::LogSink => "log-sink",
            InfraService::ObjectStore => "object-store",
        }
    }
}

/// Attachment class of a private endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointClass {
    /// A private network interface per subnet, fronted by a security
    /// boundary, with the service's public DNS name overridden to resolve
    /// to the private interface
    Interface,

    /// A route-table entry; no network interface, no boundary, no DNS
    /// override
    Gateway,
}

/// One private link from the network to a named infrastructure service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub id: EndpointId,
    pub service: InfraService,
    pub class: EndpointClass,

    /// Subnets the endpoint serves (interface class) or whose route tables
    /// it attaches to (gateway class)
    pub subnet_ids: Vec<SubnetId>,

    /// Shared boundary for interface-class endpoints; gateway-class carry none
    pub security_boundary: Option<BoundaryId>,

    /// Private DNS override, so client code keeps using the public name
    pub private_dns: bool,

    /// Region-qualified service identifier
    pub service_name: String,
}

/// The connectivity fabric: one endpoint per requested service plus the
/// shared interface-endpoint boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityFabric {
    pub endpoints: Vec<ServiceEndpoint>,
    pub boundary: SecurityBoundary,
}

impl ConnectivityFabric {
    /// Build the fabric for the given services over the given subnets.
    ///
    /// The boundary's ingress set is derived mechanically from the subnet
    /// CIDR list; it is regenerated whole whenever the layout changes,
    /// never edited independently.
    pub fn build(region: &str, services: &[InfraService], subnets: &[Subnet]) -> Result<Self> {
        if subnets.is_empty() {
            return Err(GangwayError::validation(
                "connectivity fabric requires at least one isolated subnet",
            ));
        }
        if services.is_empty() {
            return Err(GangwayError::validation(
                "connectivity fabric requires at least one infrastructure service",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for service in services {
            if !seen.insert(*service) {
                return Err(GangwayError::conflict(
                    format!("duplicate endpoint for service '{}'", service.short_name()),
                    "service-endpoint",
                ));
            }
        }

        let boundary = derive_boundary(subnets);
        let subnet_ids: Vec<SubnetId> = subnets.iter().map(|s| s.id.clone()).collect();

        let endpoints = services
            .iter()
            .map(|service| {
                let class = service.endpoint_class();
                ServiceEndpoint {
                    id: EndpointId::new(),
                    service: *service,
                    class,
                    subnet_ids: subnet_ids.clone(),
                    security_boundary: match class {
                        EndpointClass::Interface => Some(boundary.id.clone()),
                        EndpointClass::Gateway => None,
                    },
                    private_dns: class == EndpointClass::Interface,
                    service_name: service.service_name(region),
                }
            })
            .collect();

        Ok(Self { endpoints, boundary })
    }

    /// Endpoints of the given class
    pub fn endpoints_of_class(&self, class: EndpointClass) -> Vec<&ServiceEndpoint> {
        self.endpoints.iter().filter(|e| e.class == class).collect()
    }
}

/// Derive the interface-endpoint boundary from the current subnet list:
/// inbound HTTPS only, and only from the subnets' own CIDR ranges.
///
/// Self-referential trust: the fabric trusts exactly the workload it
/// serves, nothing else.
pub fn derive_boundary(subnets: &[Subnet]) -> SecurityBoundary {
    subnets.iter().fold(
        SecurityBoundary::new("fabric-endpoints"),
        |boundary, subnet| boundary.allow(Protocol::Tcp, 443, RuleSource::Cidr(subnet.cidr)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network::NetworkSpec;

    fn subnets() -> Vec<Subnet> {
        NetworkSpec::new("backend", "10.0.0.0/16".parse().unwrap(), 2)
            .build("us-east-1")
            .unwrap()
            .subnets
    }

    #[test]
    fn one_endpoint_per_service() {
        let fabric =
            ConnectivityFabric::build("us-east-1", &InfraService::standard_set(), &subnets())
                .unwrap();
        assert_eq!(fabric.endpoints.len(), 4);
    }

    #[test]
    fn object_store_is_gateway_class_without_boundary() {
        let fabric =
            ConnectivityFabric::build("us-east-1", &InfraService::standard_set(), &subnets())
                .unwrap();
        let gateways = fabric.endpoints_of_class(EndpointClass::Gateway);
        assert_eq!(gateways.len(), 1);
        assert_eq!(gateways[0].service, InfraService::ObjectStore);
        assert!(gateways[0].security_boundary.is_none());
        assert!(!gateways[0].private_dns);
    }

    #[test]
    fn interface_endpoints_share_boundary_and_override_dns() {
        let fabric =
            ConnectivityFabric::build("us-east-1", &InfraService::standard_set(), &subnets())
                .unwrap();
        let interfaces = fabric.endpoints_of_class(EndpointClass::Interface);
        assert_eq!(interfaces.len(), 3);
        for endpoint in interfaces {
            assert_eq!(endpoint.security_boundary.as_ref(), Some(&fabric.boundary.id));
            assert!(endpoint.private_dns);
        }
    }

    #[test]
    fn boundary_ingress_is_exactly_the_subnet_cidrs() {
        let subnets = subnets();
        let boundary = derive_boundary(&subnets);

        let expected: Vec<_> = subnets.iter().map(|s| s.cidr).collect();
        assert_eq!(boundary.cidr_sources(), expected);
        assert!(boundary.ingress.iter().all(|r| r.port == 443 && r.protocol == Protocol::Tcp));
    }

    #[test]
    fn boundary_derivation_is_deterministic() {
        let subnets = subnets();
        let first = derive_boundary(&subnets);
        let second = derive_boundary(&subnets);
        assert_eq!(first.ingress, second.ingress);
    }

    #[test]
    fn service_names_are_region_qualified() {
        assert_eq!(
            InfraService::RegistryDocker.service_name("eu-west-2"),
            "com.amazonaws.eu-west-2.ecr.dkr"
        );
        assert_eq!(InfraService::ObjectStore.service_name("us-east-1"), "com.amazonaws.us-east-1.s3");
    }

    #[test]
    fn duplicate_service_is_a_conflict() {
        let services = vec![InfraService::LogSink, InfraService::LogSink];
        let err = ConnectivityFabric::build("us-east-1", &services, &subnets()).unwrap_err();
        assert!(matches!(err, GangwayError::Conflict { .. }));
    }

    #[test]
    fn empty_subnets_rejected() {
        let err =
            ConnectivityFabric::build("us-east-1", &InfraService::standard_set(), &[]).unwrap_err();
        assert!(matches!(err, GangwayError::Validation { .. }));
    }
}
