//! Resource dependency graph
//!
//! The topology is materialized by an external provisioning engine in
//! dependency order. This module holds the explicit DAG of construction
//! steps with typed dependency edges, replacing any reliance on source
//! statement order: the builder declares "bridge depends on listener" as
//! data, and the sort enforces it.

use crate::errors::{GangwayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Kind of a provisioned resource, for plan rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Network,
    Subnet,
    SecurityBoundary,
    ServiceEndpoint,
    LoadBalancer,
    Listener,
    RoutingRule,
    TargetGroup,
    WorkloadCluster,
    WorkloadService,
    PrivateLink,
    BridgeRoute,
}

/// One node in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Unique resource name within the topology
    pub name: String,

    pub kind: ResourceKind,

    /// Names of resources that must exist before this one
    pub depends_on: Vec<String>,
}

/// Directed acyclic graph of resource-construction steps
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    // BTreeMap keeps sibling ordering stable across runs
    nodes: BTreeMap<String, ResourceNode>,
    insertion_order: Vec<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource node. Duplicate names are construction-time conflicts.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        kind: ResourceKind,
        depends_on: Vec<String>,
    ) -> Result<()> {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            return Err(GangwayError::conflict(
                format!("resource '{}' declared twice", name),
                "resource-node",
            ));
        }
        self.insertion_order.push(name.clone());
        self.nodes.insert(name.clone(), ResourceNode { name, kind, depends_on });
        Ok(())
    }

    /// Number of declared resources
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by name
    pub fn node(&self, name: &str) -> Option<&ResourceNode> {
        self.nodes.get(name)
    }

    /// Topologically sort the graph (Kahn's algorithm).
    ///
    /// Fails on an edge to an undeclared resource or on a dependency cycle;
    /// both are dependency-ordering errors the builder must never emit.
    pub fn topo_sort(&self) -> Result<Vec<&ResourceNode>> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for node in self.nodes.values() {
            in_degree.entry(node.name.as_str()).or_insert(0);
            for dep in &node.depends_on {
                if !self.nodes.contains_key(dep) {
                    return Err(GangwayError::dependency_order(
                        node.name.clone(),
                        format!("undeclared resource '{}'", dep),
                    ));
                }
                *in_degree.entry(node.name.as_str()).or_insert(0) += 1;
                dependents.entry(dep.as_str()).or_default().push(node.name.as_str());
            }
        }

        // Seed with ready nodes in insertion order so the plan reads the
        // way the topology was declared
        let mut queue: VecDeque<&str> = self
            .insertion_order
            .iter()
            .map(String::as_str)
            .filter(|name| in_degree.get(name) == Some(&0))
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(name) = queue.pop_front() {
            sorted.push(&self.nodes[name]);
            if let Some(children) = dependents.get(name) {
                for child in children {
                    if let Some(degree) = in_degree.get_mut(child) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(child);
                        }
                    }
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let stuck: Vec<&str> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(name, _)| *name)
                .collect();
            return Err(GangwayError::dependency_order(
                stuck.join(", "),
                "a dependency cycle to be broken".to_string(),
            ));
        }

        Ok(sorted)
    }
}
