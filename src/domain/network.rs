//! Network boundary domain types
//!
//! This module contains pure domain entities for the isolated address space:
//! the network, its zone-replicated subnets, and the default-deny security
//! boundaries attached to network interfaces. No NAT gateway type exists in
//! this model at all. Isolated subnets have zero internet egress by
//! construction, not by configuration.

use crate::domain::id::{BoundaryId, NetworkId, SubnetId};
use crate::errors::{GangwayError, Result};
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};

/// Visibility class of a subnet group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// No route to the public internet
    Isolated,

    /// Routable from the public internet (unused by the private topology,
    /// kept for completeness of the model)
    Public,
}

/// A single subnet, replicated per availability zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    /// Subnet identifier
    pub id: SubnetId,

    /// Human-readable name (network name + zone)
    pub name: String,

    /// Availability zone this subnet lives in
    pub zone: String,

    /// Address range carved from the network CIDR
    pub cidr: Ipv4Network,

    /// Visibility class
    pub visibility: Visibility,
}

impl Subnet {
    /// Whether this subnet has any route to the public internet.
    ///
    /// Isolated subnets never do: the model has no NAT gateway type, so
    /// there is nothing that could grant egress after construction.
    pub fn has_internet_route(&self) -> bool {
        matches!(self.visibility, Visibility::Public)
    }
}

/// Transport protocol for security-boundary rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Tcp,
    Udp,
}

/// Source of permitted traffic in an ingress rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    /// Any IPv4 source (0.0.0.0/0)
    AnyIpv4,

    /// A specific CIDR block
    Cidr(Ipv4Network),
}

/// A single allow-rule in a security boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub protocol: Protocol,
    pub port: u16,
    pub source: RuleSource,
}

/// A named set of allow-rules attached to a network interface group.
///
/// Default-deny: only ingress listed here is permitted. There is no way to
/// express a broader allowance than the rules carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityBoundary {
    pub id: BoundaryId,
    pub name: String,
    pub ingress: Vec<IngressRule>,
}

impl SecurityBoundary {
    /// Create an empty (deny-everything) boundary
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: BoundaryId::new(), name: name.into(), ingress: Vec::new() }
    }

    /// Add an allow-rule
    pub fn allow(mut self, protocol: Protocol, port: u16, source: RuleSource) -> Self {
        self.ingress.push(IngressRule { protocol, port, source });
        self
    }

    /// The set of CIDR sources across all rules, in rule order
    pub fn cidr_sources(&self) -> Vec<Ipv4Network> {
        self.ingress
            .iter()
            .filter_map(|rule| match &rule.source {
                RuleSource::Cidr(cidr) => Some(*cidr),
                RuleSource::AnyIpv4 => None,
            })
            .collect()
    }
}

/// Specification for the network boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Network name
    pub name: String,

    /// Address space to partition
    pub cidr: Ipv4Network,

    /// Number of availability zones to replicate subnets across
    pub zone_count: u8,

    /// Zones actually available in the target environment
    pub max_zones_available: u8,
}

impl NetworkSpec {
    /// Create a spec with the given name and address space
    pub fn new(name: impl Into<String>, cidr: Ipv4Network, zone_count: u8) -> Self {
        Self { name: name.into(), cidr, zone_count, max_zones_available: 3 }
    }

    /// Set the environment's zone availability ceiling
    pub fn with_max_zones(mut self, max_zones_available: u8) -> Self {
        self.max_zones_available = max_zones_available;
        self
    }

    /// Build the network: one isolated subnet per zone, CIDRs carved
    /// deterministically from the network range, no egress path anywhere.
    ///
    /// Fails before producing anything when the zone count is zero or
    /// exceeds the environment's availability.
    pub fn build(&self, region: &str) -> Result<Network> {
        if self.zone_count == 0 {
            return Err(GangwayError::validation_field(
                "zone count must be at least 1",
                "network.zone_count",
            ));
        }
        if self.zone_count > self.max_zones_available {
            return Err(GangwayError::config(format!(
                "requested {} availability zones but only {} are available",
                self.zone_count, self.max_zones_available
            )));
        }

        let blocks = carve(self.cidr, self.zone_count as usize)?;
        let subnets = blocks
            .into_iter()
            .enumerate()
            .map(|(index, cidr)| {
                let zone = zone_name(region, index);
                Subnet {
                    id: SubnetId::new(),
                    name: format!("{}-isolated-{}", self.name, zone),
                    zone,
                    cidr,
                    visibility: Visibility::Isolated,
                }
            })
            .collect();

        Ok(Network { id: NetworkId::new(), name: self.name.clone(), cidr: self.cidr, subnets })
    }
}

/// The materialized network boundary: an address space and its subnets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub id: NetworkId,
    pub name: String,
    pub cidr: Ipv4Network,
    pub subnets: Vec<Subnet>,
}

impl Network {
    /// All isolated subnets, in zone order
    pub fn isolated_subnets(&self) -> Vec<&Subnet> {
        self.subnets.iter().filter(|s| s.visibility == Visibility::Isolated).collect()
    }

    /// Whether any subnet has a route to the public internet
    pub fn has_internet_egress(&self) -> bool {
        self.subnets.iter().any(Subnet::has_internet_route)
    }

    /// The distinct availability zones covered by this network
    pub fn zones(&self) -> Vec<&str> {
        let mut zones: Vec<&str> = self.subnets.iter().map(|s| s.zone.as_str()).collect();
        zones.dedup();
        zones
    }

    /// Look up a subnet by ID
    pub fn subnet(&self, id: &SubnetId) -> Option<&Subnet> {
        self.subnets.iter().find(|s| &s.id == id)
    }
}

/// Availability-zone name for the given region and index (a, b, c, ...)
fn zone_name(region: &str, index: usize) -> String {
    let suffix = (b'a' + (index as u8 % 26)) as char;
    format!("{}{}", region, suffix)
}

/// Carve `count` equally sized child blocks out of `cidr`, deterministically.
///
/// Children use a /8-narrower prefix than the parent (capped at /28) so the
/// same parent CIDR always yields the same subnet layout. Fails when the
/// parent cannot hold `count` children at that width.
pub fn carve(cidr: Ipv4Network, count: usize) -> Result<Vec<Ipv4Network>> {
    let parent_prefix = cidr.prefix();
    let child_prefix = (parent_prefix + 8).min(28);
    if child_prefix <= parent_prefix {
        return Err(GangwayError::config(format!(
            "network CIDR {} is too narrow to partition into subnets",
            cidr
        )));
    }

    let available = 1u64 << (child_prefix - parent_prefix);
    if count as u64 > available {
        return Err(GangwayError::config(format!(
            "network CIDR {} holds only {} /{} subnets, {} requested",
            cidr, available, child_prefix, count
        )));
    }

    let block_size = 1u32 << (32 - child_prefix);
    let base: u32 = cidr.network().into();

    (0..count)
        .map(|i| {
            let addr = std::net::Ipv4Addr::from(base + (i as u32) * block_size);
            Ipv4Network::new(addr, child_prefix).map_err(GangwayError::from)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(zone_count: u8) -> NetworkSpec {
        NetworkSpec::new("backend", "10.0.0.0/16".parse().unwrap(), zone_count)
    }

    #[test]
    fn builds_one_isolated_subnet_per_zone() {
        let network = spec(2).build("us-east-1").unwrap();
        assert_eq!(network.subnets.len(), 2);
        assert_eq!(network.subnets[0].zone, "us-east-1a");
        assert_eq!(network.subnets[1].zone, "us-east-1b");
        assert!(network.subnets.iter().all(|s| s.visibility == Visibility::Isolated));
    }

    #[test]
    fn carved_cidrs_are_disjoint_and_deterministic() {
        let network = spec(3).with_max_zones(3).build("us-east-1").unwrap();
        let cidrs: Vec<_> = network.subnets.iter().map(|s| s.cidr).collect();
        assert_eq!(cidrs[0], "10.0.0.0/24".parse::<Ipv4Network>().unwrap());
        assert_eq!(cidrs[1], "10.0.1.0/24".parse::<Ipv4Network>().unwrap());
        assert_eq!(cidrs[2], "10.0.2.0/24".parse::<Ipv4Network>().unwrap());

        // Rebuilding from the same spec carves the same layout
        let again = spec(3).with_max_zones(3).build("us-east-1").unwrap();
        let again_cidrs: Vec<_> = again.subnets.iter().map(|s| s.cidr).collect();
        assert_eq!(cidrs, again_cidrs);
    }

    #[test]
    fn no_internet_egress_by_construction() {
        let network = spec(2).build("us-east-1").unwrap();
        assert!(!network.has_internet_egress());
        assert!(network.subnets.iter().all(|s| !s.has_internet_route()));
    }

    #[test]
    fn zone_count_over_availability_is_fatal() {
        let err = spec(3).with_max_zones(2).build("us-east-1").unwrap_err();
        assert!(matches!(err, GangwayError::Config { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn zero_zone_count_is_fatal() {
        let err = spec(0).build("us-east-1").unwrap_err();
        assert!(matches!(err, GangwayError::Validation { .. }));
    }

    #[test]
    fn narrow_cidr_cannot_be_partitioned() {
        let spec = NetworkSpec::new("tiny", "10.0.0.0/28".parse().unwrap(), 2);
        assert!(spec.build("us-east-1").is_err());
    }

    #[test]
    fn security_boundary_is_default_deny() {
        let boundary = SecurityBoundary::new("fabric");
        assert!(boundary.ingress.is_empty());

        let boundary = boundary
            .allow(Protocol::Tcp, 443, RuleSource::Cidr("10.0.0.0/24".parse().unwrap()))
            .allow(Protocol::Tcp, 443, RuleSource::Cidr("10.0.1.0/24".parse().unwrap()));
        assert_eq!(boundary.ingress.len(), 2);
        assert_eq!(boundary.cidr_sources().len(), 2);
    }

    #[test]
    fn any_source_not_counted_as_cidr() {
        let boundary =
            SecurityBoundary::new("listener").allow(Protocol::Tcp, 80, RuleSource::AnyIpv4);
        assert!(boundary.cidr_sources().is_empty());
    }
}
