//! Materialization plan
//!
//! The plan is the crate's externally consumed artifact: an ordered list of
//! resource-construction steps, each naming its dependencies, for the
//! external provisioning engine to apply with all-or-nothing semantics.

use crate::errors::{GangwayError, Result};
use crate::topology::graph::ResourceKind;
use crate::topology::Topology;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ordered step of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// 1-based apply order
    pub order: usize,

    /// Resource name, unique within the topology
    pub resource: String,

    pub kind: ResourceKind,

    /// Resources that must exist before this step applies
    pub depends_on: Vec<String>,
}

/// Dependency-ordered materialization plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializationPlan {
    pub generated_at: DateTime<Utc>,
    pub region: String,
    pub steps: Vec<PlanStep>,
}

impl MaterializationPlan {
    /// Derive the plan from a frozen topology
    pub fn from_topology(topology: &Topology) -> Result<Self> {
        let graph = topology.graph()?;
        let sorted = graph.topo_sort()?;

        let steps = sorted
            .into_iter()
            .enumerate()
            .map(|(index, node)| PlanStep {
                order: index + 1,
                resource: node.name.clone(),
                kind: node.kind,
                depends_on: node.depends_on.clone(),
            })
            .collect();

        Ok(Self { generated_at: Utc::now(), region: topology.region.clone(), steps })
    }

    /// Number of steps in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Position of a resource in the apply order, if present
    pub fn position(&self, resource: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.resource == resource)
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(GangwayError::from)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GangwayError::internal(format!("YAML rendering failed: {}", e)))
    }
}
