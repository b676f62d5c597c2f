//! Compute workload domain types
//!
//! A cluster groups a scalable set of replicas running one task
//! specification. The only scaling control is the desired count; convergence
//! (replacing unhealthy replicas, spreading across zones) belongs to the
//! platform's orchestrator. Replicas live in isolated subnets only and
//! register as members of one or more target groups, so a single deployable
//! unit can serve several route-path families.

use crate::domain::id::{ReplicaId, SubnetId, TargetGroupId};
use crate::domain::network::{Protocol, Subnet};
use crate::errors::{GangwayError, Result};
use serde::{Deserialize, Serialize};

/// Reference to a pre-existing container image repository, by name.
///
/// The core never inspects the image; it only validates the reference's
/// shape and hands the name to the provisioning engine for resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef {
    repository: String,
}

impl ImageRef {
    /// Parse and validate a repository reference.
    ///
    /// Repository names are lowercase alphanumeric segments separated by
    /// `/`, with `-`, `_` and `.` allowed inside a segment. A malformed or
    /// empty name is a fatal configuration error.
    pub fn parse(repository: &str) -> Result<Self> {
        if repository.is_empty() {
            return Err(GangwayError::not_found("image-repository", "<empty>"));
        }
        let valid_segment = |segment: &str| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "-_.".contains(c))
                && !segment.starts_with(['-', '.', '_'])
        };
        if !repository.split('/').all(valid_segment) {
            return Err(GangwayError::config(format!(
                "image repository reference '{}' is not a valid repository name",
                repository
            )));
        }
        Ok(Self { repository: repository.to_string() })
    }

    /// The repository name
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

/// Task specification: what every replica runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Image repository reference
    pub image: ImageRef,

    /// CPU units allotted to each replica
    pub cpu: u32,

    /// Memory limit in MiB
    pub memory_mib: u32,

    /// Port the container listens on
    pub container_port: u16,

    /// Container port protocol
    pub protocol: Protocol,

    /// Log destination name prefix (the log group is created for the task;
    /// its backend configuration is out of scope)
    pub log_prefix: String,
}

impl TaskSpec {
    /// Create a task spec with the standard HTTP port-80 contract
    pub fn new(image: ImageRef, cpu: u32, memory_mib: u32, log_prefix: impl Into<String>) -> Self {
        Self {
            image,
            cpu,
            memory_mib,
            container_port: 80,
            protocol: Protocol::Tcp,
            log_prefix: log_prefix.into(),
        }
    }

    /// Validate resource limits
    pub fn validate(&self) -> Result<()> {
        if self.cpu == 0 {
            return Err(GangwayError::validation_field("cpu units must be positive", "task.cpu"));
        }
        if self.memory_mib == 0 {
            return Err(GangwayError::validation_field(
                "memory limit must be positive",
                "task.memory_mib",
            ));
        }
        if self.log_prefix.is_empty() {
            return Err(GangwayError::validation_field(
                "log destination prefix cannot be empty",
                "task.log_prefix",
            ));
        }
        Ok(())
    }
}

/// One running instance of the task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    pub id: ReplicaId,

    /// Subnet (and therefore zone) the replica is placed in
    pub subnet_id: SubnetId,

    /// Availability zone, denormalized for plan output
    pub zone: String,

    pub container_port: u16,
    pub protocol: Protocol,
}

/// A scaled service: one task spec, a desired count, and the target groups
/// its replicas register in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadService {
    pub name: String,
    pub task: TaskSpec,
    desired_count: u32,
    replicas: Vec<Replica>,

    /// Target groups every replica registers in (non-owning references)
    pub target_groups: Vec<TargetGroupId>,
}

impl WorkloadService {
    /// Create a service with no replicas yet
    pub fn new(name: impl Into<String>, task: TaskSpec, target_groups: Vec<TargetGroupId>) -> Result<Self> {
        task.validate()?;
        if target_groups.is_empty() {
            return Err(GangwayError::validation(
                "workload service must register in at least one target group",
            ));
        }
        Ok(Self { name: name.into(), task, desired_count: 0, replicas: Vec::new(), target_groups })
    }

    /// The only scaling control: set the desired replica count and place
    /// replicas round-robin across the given subnets. Target-group
    /// identities and rule priorities are never touched by scaling.
    ///
    /// Placement is the declarative shape the orchestrator converges to;
    /// replacement of unhealthy replicas at runtime is its job, not ours.
    pub fn set_desired_count(&mut self, count: u32, subnets: &[Subnet]) -> Result<()> {
        if subnets.is_empty() {
            return Err(GangwayError::validation(
                "cannot place replicas without isolated subnets",
            ));
        }
        self.desired_count = count;
        self.replicas = (0..count as usize)
            .map(|i| {
                let subnet = &subnets[i % subnets.len()];
                Replica {
                    id: ReplicaId::new(),
                    subnet_id: subnet.id.clone(),
                    zone: subnet.zone.clone(),
                    container_port: self.task.container_port,
                    protocol: self.task.protocol,
                }
            })
            .collect();
        Ok(())
    }

    /// Desired replica count
    pub fn desired_count(&self) -> u32 {
        self.desired_count
    }

    /// Current declared replicas
    pub fn replicas(&self) -> &[Replica] {
        &self.replicas
    }

    /// Zones the current replicas cover, deduplicated
    pub fn zones_covered(&self) -> Vec<&str> {
        let mut zones: Vec<&str> = self.replicas.iter().map(|r| r.zone.as_str()).collect();
        zones.sort_unstable();
        zones.dedup();
        zones
    }
}

/// A cluster grouping workload services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadCluster {
    pub name: String,
    pub services: Vec<WorkloadService>,
}

impl WorkloadCluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), services: Vec::new() }
    }

    pub fn add_service(&mut self, service: WorkloadService) {
        self.services.push(service);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network::NetworkSpec;

    fn subnets(zones: u8) -> Vec<Subnet> {
        NetworkSpec::new("backend", "10.0.0.0/16".parse().unwrap(), zones)
            .build("us-east-1")
            .unwrap()
            .subnets
    }

    fn service() -> WorkloadService {
        let task = TaskSpec::new(ImageRef::parse("backend/api").unwrap(), 256, 512, "backend");
        WorkloadService::new("api", task, vec![TargetGroupId::new(), TargetGroupId::new()])
            .unwrap()
    }

    #[test]
    fn image_ref_accepts_repository_names() {
        assert!(ImageRef::parse("backend").is_ok());
        assert!(ImageRef::parse("team/backend-api").is_ok());
        assert!(ImageRef::parse("a0/b.c_d").is_ok());
    }

    #[test]
    fn image_ref_rejects_malformed_names() {
        assert!(ImageRef::parse("").is_err());
        assert!(ImageRef::parse("Backend").is_err());
        assert!(ImageRef::parse("team//api").is_err());
        assert!(ImageRef::parse("-leading").is_err());
        assert!(ImageRef::parse("spaces in name").is_err());
    }

    #[test]
    fn replicas_spread_round_robin_across_zones() {
        let subnets = subnets(2);
        let mut service = service();
        service.set_desired_count(2, &subnets).unwrap();

        assert_eq!(service.replicas().len(), 2);
        assert_eq!(service.zones_covered(), vec!["us-east-1a", "us-east-1b"]);
    }

    #[test]
    fn more_replicas_than_zones_wraps_around() {
        let subnets = subnets(2);
        let mut service = service();
        service.set_desired_count(5, &subnets).unwrap();

        assert_eq!(service.replicas().len(), 5);
        let in_a = service.replicas().iter().filter(|r| r.zone == "us-east-1a").count();
        let in_b = service.replicas().iter().filter(|r| r.zone == "us-east-1b").count();
        assert_eq!(in_a, 3);
        assert_eq!(in_b, 2);
    }

    #[test]
    fn scaling_does_not_disturb_target_group_identities() {
        let subnets = subnets(2);
        let mut service = service();
        let groups_before = service.target_groups.clone();

        service.set_desired_count(2, &subnets).unwrap();
        service.set_desired_count(0, &subnets).unwrap();
        assert!(service.replicas().is_empty());
        service.set_desired_count(2, &subnets).unwrap();

        assert_eq!(service.target_groups, groups_before);
        assert_eq!(service.desired_count(), 2);
    }

    #[test]
    fn replicas_only_in_provided_subnets() {
        let subnets = subnets(2);
        let mut service = service();
        service.set_desired_count(4, &subnets).unwrap();

        let subnet_ids: Vec<_> = subnets.iter().map(|s| s.id.clone()).collect();
        assert!(service.replicas().iter().all(|r| subnet_ids.contains(&r.subnet_id)));
    }

    #[test]
    fn task_spec_validation() {
        let image = ImageRef::parse("backend").unwrap();
        assert!(TaskSpec::new(image.clone(), 0, 512, "logs").validate().is_err());
        assert!(TaskSpec::new(image.clone(), 256, 0, "logs").validate().is_err());
        assert!(TaskSpec::new(image.clone(), 256, 512, "").validate().is_err());
        assert!(TaskSpec::new(image, 256, 512, "logs").validate().is_ok());
    }

    #[test]
    fn service_requires_a_target_group() {
        let task = TaskSpec::new(ImageRef::parse("backend").unwrap(), 256, 512, "logs");
        assert!(WorkloadService::new("api", task, vec![]).is_err());
    }

    #[test]
    fn default_task_contract_is_http_80() {
        let task = TaskSpec::new(ImageRef::parse("backend").unwrap(), 256, 512, "logs");
        assert_eq!(task.container_port, 80);
        assert_eq!(task.protocol, Protocol::Tcp);
    }
}
