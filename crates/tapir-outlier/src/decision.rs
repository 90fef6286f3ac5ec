//! Outlier decision: the termination policy.

use tracing::{debug, warn};

use tapir_core::DecisionContext;

/// Points (percent) an instance must sit above its peers' average.
pub const PEER_MARGIN: f64 = 50.0;

/// Classification of one instance for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// Over threshold and at least `PEER_MARGIN` above peers.
    Outlier,
    /// At or below the absolute threshold.
    UnderThreshold,
    /// Over threshold but there is no peer baseline (peer average is 0.0).
    NoPeerBaseline,
    /// Over threshold, but peers are loaded too.
    WithinPeerMargin,
}

impl Assessment {
    pub fn is_outlier(&self) -> bool {
        matches!(self, Assessment::Outlier)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Assessment::Outlier => "outlier",
            Assessment::UnderThreshold => "under threshold",
            Assessment::NoPeerBaseline => "no peer baseline",
            Assessment::WithinPeerMargin => "within peer margin",
        }
    }
}

/// Classify `current_value` against `threshold` and `peer_average`.
pub fn classify(current_value: f64, threshold: f64, peer_average: f64) -> Assessment {
    if current_value <= threshold {
        return Assessment::UnderThreshold;
    }
    if peer_average == 0.0 {
        return Assessment::NoPeerBaseline;
    }
    if current_value - peer_average >= PEER_MARGIN {
        Assessment::Outlier
    } else {
        Assessment::WithinPeerMargin
    }
}

/// `true` when the instance should be terminated.
pub fn decide(current_value: f64, threshold: f64, peer_average: f64) -> bool {
    classify(current_value, threshold, peer_average).is_outlier()
}

/// Classify a decision context.
pub fn assess(ctx: &DecisionContext) -> Assessment {
    classify(ctx.current_value, ctx.threshold, ctx.peer_average)
}

/// Emit the decision record for `ctx`.
pub fn log_assessment(ctx: &DecisionContext, assessment: Assessment) {
    let diff = ctx.current_value - ctx.peer_average;
    if assessment.is_outlier() {
        warn!(
            instance = %ctx.instance,
            group = %ctx.group,
            metric = %ctx.metric,
            current = ctx.current_value,
            threshold = ctx.threshold,
            peer_average = ctx.peer_average,
            diff,
            "{} is above {} and at least {} points above the rest of its group",
            ctx.instance,
            ctx.threshold,
            PEER_MARGIN
        );
    } else {
        debug!(
            instance = %ctx.instance,
            metric = %ctx.metric,
            current = ctx.current_value,
            peer_average = ctx.peer_average,
            diff,
            reason = assessment.label(),
            "not an outlier"
        );
    }
}
