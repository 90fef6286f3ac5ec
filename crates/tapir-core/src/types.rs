//! Shared types used across Tapir crates.

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// Opaque identifier of a compute instance (e.g. `i-0abc123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Name of an auto-scaling group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Lifecycle phase of an instance inside its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Pending,
    InService,
    Terminating,
    /// Any other provider state (standby, detaching, warm pool, ...).
    Other(String),
}

impl LifecycleState {
    /// Parse a provider lifecycle string such as `InService` or `Pending:Wait`.
    pub fn parse(s: &str) -> Self {
        match s.split(':').next().unwrap_or(s) {
            "InService" => LifecycleState::InService,
            "Pending" => LifecycleState::Pending,
            "Terminating" | "Terminated" => LifecycleState::Terminating,
            _ => LifecycleState::Other(s.to_string()),
        }
    }

    pub fn is_in_service(&self) -> bool {
        matches!(self, LifecycleState::InService)
    }
}

/// One row of a fleet membership listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetMember {
    pub group: GroupId,
    pub instance: InstanceId,
    pub lifecycle: LifecycleState,
}

impl FleetMember {
    pub fn new(group: &str, instance: &str, lifecycle: LifecycleState) -> Self {
        Self {
            group: GroupId::new(group),
            instance: InstanceId::new(instance),
            lifecycle,
        }
    }

    pub fn in_service(group: &str, instance: &str) -> Self {
        Self::new(group, instance, LifecycleState::InService)
    }
}

/// An auto-scaling group and its in-service members, in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub members: Vec<InstanceId>,
}

/// The fleet as seen by one run: groups in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fleet {
    pub groups: Vec<Group>,
}

impl Fleet {
    /// Group membership rows by group, keeping only in-service instances.
    ///
    /// Group order and member order follow the order of `members`. A group
    /// whose members are all out of service does not appear.
    pub fn from_members(members: impl IntoIterator<Item = FleetMember>) -> Self {
        let mut groups: Vec<Group> = Vec::new();

        for member in members {
            if !member.lifecycle.is_in_service() {
                continue;
            }
            match groups.iter_mut().find(|g| g.id == member.group) {
                Some(group) => group.members.push(member.instance),
                None => groups.push(Group {
                    id: member.group,
                    members: vec![member.instance],
                }),
            }
        }

        Self { groups }
    }

    pub fn instance_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// Identifies a telemetry series. Values are percentages (0–100).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub namespace: String,
    pub name: String,
}

impl MetricDefinition {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// EC2 CPU utilization, the reference metric.
    pub fn ec2_cpu() -> Self {
        Self::new("AWS/EC2", "CPUUtilization")
    }
}

impl fmt::Display for MetricDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Half-open query interval `[start, end)` sampled every `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    pub start: SystemTime,
    pub end: SystemTime,
    pub period: Duration,
}

impl SampleWindow {
    /// Window of `duration` ending at `end`.
    pub fn ending_at(end: SystemTime, duration: Duration, period: Duration) -> Self {
        let start = end.checked_sub(duration).unwrap_or(SystemTime::UNIX_EPOCH);
        Self { start, end, period }
    }

    pub fn duration(&self) -> Duration {
        self.end.duration_since(self.start).unwrap_or_default()
    }
}

/// One per-period sample returned by the telemetry source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datapoint {
    pub timestamp: SystemTime,
    pub average: f64,
}

/// Whether terminations are carried out or only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Live,
    DryRun,
}

impl ExecutionMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            ExecutionMode::DryRun
        } else {
            ExecutionMode::Live
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, ExecutionMode::DryRun)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Live => f.write_str("live"),
            ExecutionMode::DryRun => f.write_str("dry-run"),
        }
    }
}

/// Everything the outlier decision needs for one instance and one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionContext {
    pub instance: InstanceId,
    pub group: GroupId,
    pub metric: MetricDefinition,
    pub current_value: f64,
    pub peer_average: f64,
    pub threshold: f64,
}

/// Outcome of one fleet walk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    pub mode: ExecutionMode,
    pub groups_checked: usize,
    pub instances_evaluated: usize,
    /// Every decision that flagged an outlier, in evaluation order.
    pub outliers: Vec<DecisionContext>,
    /// The instance terminated (or, in dry-run, selected) by this run.
    pub terminated: Option<InstanceId>,
}
