//! Internal routing layer domain types
//!
//! An internal (non-internet-facing) load balancer bound to the isolated
//! subnets, with one listener holding an ordered rule set. Rule evaluation
//! is pure and side-effect-free: patterns match as exact or segment-prefix
//! patterns (with a wildcard proxy segment), the lowest-priority matching
//! rule wins, and an explicit fallback action answers unmatched paths.

use crate::domain::id::{ListenerId, ReplicaId, SubnetId, TargetGroupId};
use crate::domain::network::{Protocol, RuleSource, SecurityBoundary};
use crate::errors::{GangwayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Path matching pattern for routing rules.
///
/// `/` matches only the root path; any other pattern matches itself or any
/// sub-path at a segment boundary. A trailing `*` (or the `/{proxy+}` proxy
/// segment) matches any remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathPattern {
    /// Exact path match
    Exact(String),

    /// Matches the pattern itself or any sub-path below it
    Prefix(String),

    /// Wildcard proxy segment: matches every path
    Any,
}

impl PathPattern {
    /// Parse a pattern string.
    ///
    /// `*`, `/*` and `/{proxy+}` parse to the wildcard; `/` parses to an
    /// exact root match; anything else is a segment-boundary prefix, with a
    /// trailing `*` stripped.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(GangwayError::validation_field("path pattern cannot be empty", "pattern"));
        }
        match pattern {
            "*" | "/*" | "/{proxy+}" => return Ok(PathPattern::Any),
            "/" => return Ok(PathPattern::Exact("/".to_string())),
            _ => {}
        }
        if !pattern.starts_with('/') {
            return Err(GangwayError::validation_field(
                format!("path pattern '{}' must start with '/'", pattern),
                "pattern",
            ));
        }
        let trimmed = pattern.strip_suffix('*').unwrap_or(pattern);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        Ok(PathPattern::Prefix(trimmed.to_string()))
    }

    /// Check whether this pattern matches the given request path
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(pattern) => path == pattern,
            PathPattern::Prefix(prefix) => {
                path == prefix || path.strip_prefix(prefix.as_str()).is_some_and(|r| r.starts_with('/'))
            }
            PathPattern::Any => true,
        }
    }

    /// Render the pattern in route-definition form
    pub fn as_pattern_string(&self) -> String {
        match self {
            PathPattern::Exact(p) => p.clone(),
            PathPattern::Prefix(p) => format!("{}*", p),
            PathPattern::Any => "/{proxy+}".to_string(),
        }
    }
}

/// One prioritized path-matching rule on a listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    /// Evaluation priority, unique per listener; lower evaluates first
    pub priority: u32,

    /// Patterns; the rule matches when any of them does
    pub patterns: Vec<PathPattern>,

    /// Target group receiving matched traffic (non-owning reference)
    pub target_group: TargetGroupId,

    /// Path the target group's health check probes
    pub health_check_path: String,
}

/// Policy for paths no rule matches.
///
/// The permissive default answers 200 so a partially configured deployment
/// never serves 5xx for unmatched paths; operators who prefer surfacing
/// missing routes as failures select the 404 variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Fixed HTTP 200 with a static body
    #[default]
    FixedOk,

    /// Fixed HTTP 404 with the same body
    NotFound,
}

impl FallbackPolicy {
    /// The fixed response this policy produces
    pub fn response(&self) -> FixedResponse {
        let status = match self {
            FallbackPolicy::FixedOk => 200,
            FallbackPolicy::NotFound => 404,
        };
        FixedResponse { status, body: "No routes defined".to_string() }
    }
}

/// A fixed HTTP response returned without consulting any target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedResponse {
    pub status: u16,
    pub body: String,
}

/// Outcome of evaluating a request path against a listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Forward to the target group of the winning rule
    Forward { target_group: TargetGroupId, priority: u32 },

    /// No rule matched; the fallback action answers
    Fixed(FixedResponse),
}

/// A listener: one port, an ordered rule set, and a default action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listener {
    pub id: ListenerId,
    pub port: u16,

    /// Rules keyed by priority; BTreeMap keeps evaluation order ascending
    rules: BTreeMap<u32, RoutingRule>,

    pub fallback: FallbackPolicy,
}

impl Listener {
    /// Create a listener with its default action configured and no rules
    pub fn new(port: u16, fallback: FallbackPolicy) -> Self {
        Self { id: ListenerId::new(), port, rules: BTreeMap::new(), fallback }
    }

    /// Add a rule. Fails when the priority is zero or already taken.
    pub fn add_rule(
        &mut self,
        priority: u32,
        patterns: Vec<PathPattern>,
        target_group: TargetGroupId,
        health_check_path: impl Into<String>,
    ) -> Result<()> {
        if priority == 0 {
            return Err(GangwayError::validation_field(
                "rule priority must be at least 1",
                "priority",
            ));
        }
        if patterns.is_empty() {
            return Err(GangwayError::validation_field(
                "rule must declare at least one path pattern",
                "patterns",
            ));
        }
        if self.rules.contains_key(&priority) {
            return Err(GangwayError::conflict(
                format!("rule priority {} already in use on listener", priority),
                "routing-rule",
            ));
        }
        self.rules.insert(
            priority,
            RoutingRule {
                priority,
                patterns,
                target_group,
                health_check_path: health_check_path.into(),
            },
        );
        Ok(())
    }

    /// Rules in ascending priority order
    pub fn rules(&self) -> impl Iterator<Item = &RoutingRule> {
        self.rules.values()
    }

    /// Number of rules on the listener
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate a request path: the lowest-priority rule with a matching
    /// pattern wins, ties are impossible because priorities are unique, and
    /// an unmatched path gets the fallback's fixed response.
    pub fn resolve(&self, path: &str) -> RouteDecision {
        for rule in self.rules.values() {
            if rule.patterns.iter().any(|p| p.matches(path)) {
                return RouteDecision::Forward {
                    target_group: rule.target_group.clone(),
                    priority: rule.priority,
                };
            }
        }
        RouteDecision::Fixed(self.fallback.response())
    }
}

/// A named pool of routable endpoints behind a listener rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetGroup {
    pub id: TargetGroupId,
    pub name: String,
    pub port: u16,
    pub protocol: Protocol,
    pub health_check_path: String,

    /// Current members; mutated only by the workload's scaling process
    pub members: Vec<ReplicaId>,
}

impl TargetGroup {
    /// Create an empty target group
    pub fn new(name: impl Into<String>, port: u16, health_check_path: impl Into<String>) -> Self {
        Self {
            id: TargetGroupId::new(),
            name: name.into(),
            port,
            protocol: Protocol::Tcp,
            health_check_path: health_check_path.into(),
            members: Vec::new(),
        }
    }

    /// Register a replica as a routable target
    pub fn register(&mut self, replica: ReplicaId) {
        if !self.members.contains(&replica) {
            self.members.push(replica);
        }
    }

    /// Remove a replica from the eligible targets
    pub fn deregister(&mut self, replica: &ReplicaId) {
        self.members.retain(|m| m != replica);
    }
}

/// The internal load balancer: isolated-subnet placement, one listener,
/// and a boundary admitting HTTP from any source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalLoadBalancer {
    pub name: String,
    pub subnet_ids: Vec<SubnetId>,
    pub boundary: SecurityBoundary,
    pub listener: Listener,
}

impl InternalLoadBalancer {
    /// Create an internal load balancer over the given subnets with a
    /// port-80 listener and its default action configured.
    pub fn new(
        name: impl Into<String>,
        subnet_ids: Vec<SubnetId>,
        fallback: FallbackPolicy,
    ) -> Result<Self> {
        if subnet_ids.is_empty() {
            return Err(GangwayError::validation(
                "internal load balancer requires at least one isolated subnet",
            ));
        }
        let name = name.into();
        let boundary = SecurityBoundary::new(format!("{}-lb-ingress", name)).allow(
            Protocol::Tcp,
            80,
            RuleSource::AnyIpv4,
        );
        Ok(Self { name, subnet_ids, boundary, listener: Listener::new(80, fallback) })
    }
}
