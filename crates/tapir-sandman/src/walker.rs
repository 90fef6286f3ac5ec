//! Fleet walker: evaluates every in-service instance once per run.
//!
//! Groups are read fresh from the membership source, every member is
//! compared against its siblings for each configured metric, and the first
//! outlier found is handed to the termination actuator. The walker keeps a
//! single `terminated` slot: once it is filled no further termination is
//! attempted, but the remaining instances are still evaluated and logged.

use std::time::SystemTime;

use tracing::{debug, info, warn};

use tapir_core::{
    ComputeControl, DecisionContext, ExecutionMode, Fleet, Group, InstanceId, MembershipSource,
    MetricDefinition, RunReport, SampleWindow, SandmanConfig, TapirResult, TelemetrySource,
    WindowConfig,
};
use tapir_metrics::{GroupReadings, MetricAggregator};
use tapir_outlier::{assess, log_assessment};

use crate::actuator::TerminationActuator;

/// One-shot orchestration of membership, telemetry, decision and actuation.
pub struct FleetWalker<M, T, C> {
    membership: M,
    aggregator: MetricAggregator<T>,
    actuator: TerminationActuator<C>,
    metrics: Vec<MetricDefinition>,
    threshold: f64,
    window: WindowConfig,
}

impl<M, T, C> FleetWalker<M, T, C>
where
    M: MembershipSource,
    T: TelemetrySource,
    C: ComputeControl,
{
    pub fn new(
        membership: M,
        telemetry: T,
        control: C,
        mode: ExecutionMode,
        config: &SandmanConfig,
    ) -> Self {
        Self {
            membership,
            aggregator: MetricAggregator::new(telemetry),
            actuator: TerminationActuator::new(control, mode),
            metrics: config.metrics.clone(),
            threshold: config.policy.threshold,
            window: config.window.clone(),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.actuator.mode()
    }

    pub fn actuator(&self) -> &TerminationActuator<C> {
        &self.actuator
    }

    pub fn telemetry(&self) -> &T {
        self.aggregator.telemetry()
    }

    /// Walk the fleet with a sample window ending now.
    pub async fn run(&self) -> TapirResult<RunReport> {
        self.run_at(SystemTime::now()).await
    }

    /// Walk the fleet with a sample window ending at `end`.
    pub async fn run_at(&self, end: SystemTime) -> TapirResult<RunReport> {
        let window = SampleWindow::ending_at(end, self.window.duration(), self.window.period());
        let members = self.membership.list_members().await?;
        let listed = members.len();
        let fleet = Fleet::from_members(members);

        info!(
            groups = fleet.groups.len(),
            in_service = fleet.instance_count(),
            listed,
            mode = %self.mode(),
            "fleet listed"
        );

        let mut report = RunReport {
            mode: self.mode(),
            groups_checked: 0,
            instances_evaluated: fleet.instance_count(),
            outliers: Vec::new(),
            terminated: None,
        };

        for group in &fleet.groups {
            info!(group = %group.id, members = group.members.len(), "checking group");
            for metric in &self.metrics {
                self.check_group(group, metric, &window, &mut report).await?;
            }
            report.groups_checked += 1;
        }

        match &report.terminated {
            None => info!(
                groups = report.groups_checked,
                instances = report.instances_evaluated,
                "no instances found with out of the ordinary load"
            ),
            Some(instance) if self.mode().is_dry_run() => info!(
                %instance,
                "dry run: one instance would have been terminated for load far above its group"
            ),
            Some(instance) => info!(
                %instance,
                "one instance was terminated for load far above its group"
            ),
        }

        Ok(report)
    }

    async fn check_group(
        &self,
        group: &Group,
        metric: &MetricDefinition,
        window: &SampleWindow,
        report: &mut RunReport,
    ) -> TapirResult<()> {
        let readings =
            GroupReadings::collect(&self.aggregator, &group.members, metric, window).await?;

        for (instance, current_value) in readings.iter() {
            if report.terminated.as_ref() == Some(instance) {
                continue;
            }

            let ctx = DecisionContext {
                instance: instance.clone(),
                group: group.id.clone(),
                metric: metric.clone(),
                current_value,
                peer_average: readings.peer_average(instance),
                threshold: self.threshold,
            };
            info!(
                instance = %ctx.instance,
                %metric,
                current = ctx.current_value,
                peer_average = ctx.peer_average,
                "checked instance"
            );

            let assessment = assess(&ctx);
            log_assessment(&ctx, assessment);
            if !assessment.is_outlier() {
                continue;
            }

            report.outliers.push(ctx);
            if report.terminated.is_none() {
                self.terminate(instance, report).await?;
            } else {
                warn!(
                    %instance,
                    "outlier left running: this run already terminated an instance"
                );
            }
        }

        Ok(())
    }

    async fn terminate(&self, instance: &InstanceId, report: &mut RunReport) -> TapirResult<()> {
        let outcome = self.actuator.terminate(instance).await?;
        debug!(%instance, ?outcome, "actuator finished");
        // Dry-run selections fill the slot too, so at most one is reported.
        report.terminated = Some(instance.clone());
        Ok(())
    }
}
