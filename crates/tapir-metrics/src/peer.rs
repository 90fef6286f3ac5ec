//! Peer-group averages.
//!
//! `GroupReadings` aggregates each member of a group once, then answers
//! per-instance and peer-average lookups from those readings. It gives the
//! same numbers as calling `MetricAggregator::peer_average` for every member
//! but issues one telemetry query per instance instead of one per pair.

use tracing::debug;

use tapir_core::{InstanceId, MetricDefinition, SampleWindow, TapirResult, TelemetrySource};

use crate::aggregator::{MetricAggregator, mean};

/// Aggregated values for every member of one group, in member order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReadings {
    readings: Vec<(InstanceId, f64)>,
}

impl GroupReadings {
    /// Aggregate `metric` for every member over the same window.
    pub async fn collect<T: TelemetrySource>(
        aggregator: &MetricAggregator<T>,
        members: &[InstanceId],
        metric: &MetricDefinition,
        window: &SampleWindow,
    ) -> TapirResult<Self> {
        let mut readings = Vec::with_capacity(members.len());
        for member in members {
            let value = aggregator.aggregate(member, metric, window).await?;
            readings.push((member.clone(), value));
        }
        debug!(%metric, members = readings.len(), "group readings collected");
        Ok(Self { readings })
    }

    pub fn from_values(readings: Vec<(InstanceId, f64)>) -> Self {
        Self { readings }
    }

    /// The aggregated value of `instance`, if it is a member.
    pub fn value_of(&self, instance: &InstanceId) -> Option<f64> {
        self.readings
            .iter()
            .find(|(id, _)| id == instance)
            .map(|(_, v)| *v)
    }

    /// Mean of every other member's value; `0.0` when there are none.
    pub fn peer_average(&self, instance: &InstanceId) -> f64 {
        mean_excluding(&self.readings, instance)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InstanceId, f64)> {
        self.readings.iter().map(|(id, v)| (id, *v))
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Mean of the readings whose instance is not `target`.
pub fn mean_excluding(readings: &[(InstanceId, f64)], target: &InstanceId) -> f64 {
    let peers: Vec<f64> = readings
        .iter()
        .filter(|(id, _)| id != target)
        .map(|(_, v)| *v)
        .collect();
    mean(&peers)
}
