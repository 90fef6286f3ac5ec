//! Collaborator traits for the cloud APIs the sandman talks to.
//!
//! Each trait is injected into the component that needs it so tests can
//! substitute in-memory fakes. Implementations backed by AWS live in
//! `tapir-aws`.

use std::future::Future;
use std::pin::Pin;

use crate::error::TapirResult;
use crate::types::{Datapoint, FleetMember, InstanceId, MetricDefinition, SampleWindow};

/// Boxed future alias for collaborator calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lists auto-scaling group members with their lifecycle state.
pub trait MembershipSource: Send + Sync {
    /// Every instance of every group. Filtering by lifecycle is left to the caller.
    fn list_members(&self) -> BoxFuture<'_, TapirResult<Vec<FleetMember>>>;
}

/// Per-period average samples for one metric on one instance.
pub trait TelemetrySource: Send + Sync {
    /// Query `metric` for `instance` over `window`. May return no datapoints.
    fn query<'a>(
        &'a self,
        instance: &'a InstanceId,
        metric: &'a MetricDefinition,
        window: &'a SampleWindow,
    ) -> BoxFuture<'a, TapirResult<Vec<Datapoint>>>;
}

/// Compute control plane.
pub trait ComputeControl: Send + Sync {
    /// Request termination of exactly one instance.
    fn terminate<'a>(&'a self, instance: &'a InstanceId) -> BoxFuture<'a, TapirResult<()>>;
}
