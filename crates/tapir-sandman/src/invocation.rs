//! Scheduler entry point.
//!
//! The scheduler hands over an event payload and an invocation id. Neither
//! influences the decision; the id only labels the run's log lines.

use serde::{Deserialize, Serialize};
use tracing::{Instrument, info, info_span};

use tapir_core::{ComputeControl, MembershipSource, RunReport, TapirResult, TelemetrySource};

use crate::walker::FleetWalker;

/// Opaque scheduler event and context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(default)]
    pub event: serde_json::Value,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl Invocation {
    pub fn new(event: serde_json::Value) -> Self {
        Self {
            event,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Run one fleet walk for `invocation`.
pub async fn handle<M, T, C>(
    invocation: &Invocation,
    walker: &FleetWalker<M, T, C>,
) -> TapirResult<RunReport>
where
    M: MembershipSource,
    T: TelemetrySource,
    C: ComputeControl,
{
    let request_id = invocation.request_id.as_deref().unwrap_or("-");
    let span = info_span!("sandman", request_id = %request_id);

    async move {
        info!(mode = %walker.mode(), "sandman run starting");
        let report = walker.run().await?;
        info!(
            groups = report.groups_checked,
            instances = report.instances_evaluated,
            outliers = report.outliers.len(),
            terminated = ?report.terminated.as_ref().map(|i| i.as_str()),
            "sandman run finished"
        );
        Ok(report)
    }
    .instrument(span)
    .await
}
