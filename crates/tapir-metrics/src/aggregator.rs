//! Metric aggregator: reduces a telemetry window to one value.

use tracing::debug;

use tapir_core::{InstanceId, MetricDefinition, SampleWindow, TapirResult, TelemetrySource};

use crate::peer::mean_excluding;

/// Aggregates telemetry for single instances and peer groups.
pub struct MetricAggregator<T> {
    telemetry: T,
}

impl<T: TelemetrySource> MetricAggregator<T> {
    pub fn new(telemetry: T) -> Self {
        Self { telemetry }
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    /// Mean of the per-period averages for `instance` over `window`.
    ///
    /// An empty sample set yields `0.0`. That value is a policy choice and
    /// does not distinguish "no data" from "idle". Query failures propagate.
    pub async fn aggregate(
        &self,
        instance: &InstanceId,
        metric: &MetricDefinition,
        window: &SampleWindow,
    ) -> TapirResult<f64> {
        let datapoints = self.telemetry.query(instance, metric, window).await?;
        let averages: Vec<f64> = datapoints.iter().map(|d| d.average).collect();
        let value = mean(&averages);

        debug!(
            %instance,
            %metric,
            samples = datapoints.len(),
            value,
            "aggregated metric"
        );
        Ok(value)
    }

    /// Mean of `aggregate()` over every member of `members` except `target`.
    ///
    /// Returns `0.0` when `target` has no siblings.
    pub async fn peer_average(
        &self,
        target: &InstanceId,
        members: &[InstanceId],
        metric: &MetricDefinition,
        window: &SampleWindow,
    ) -> TapirResult<f64> {
        let mut readings = Vec::with_capacity(members.len());
        for member in members.iter().filter(|m| *m != target) {
            let value = self.aggregate(member, metric, window).await?;
            readings.push((member.clone(), value));
        }
        Ok(mean_excluding(&readings, target))
    }
}

/// Unweighted arithmetic mean; `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime};

    use tapir_core::{BoxFuture, Datapoint, TapirError};

    /// In-memory telemetry: instance → per-period averages.
    #[derive(Default)]
    pub(crate) struct FakeTelemetry {
        pub(crate) series: HashMap<String, Vec<f64>>,
        pub(crate) failing: Option<String>,
        pub(crate) queries: Mutex<Vec<String>>,
    }

    impl FakeTelemetry {
        pub(crate) fn with(series: Vec<(&str, Vec<f64>)>) -> Self {
            Self {
                series: series
                    .into_iter()
                    .map(|(id, values)| (id.to_string(), values))
                    .collect(),
                ..Self::default()
            }
        }

        pub(crate) fn query_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    impl TelemetrySource for FakeTelemetry {
        fn query<'a>(
            &'a self,
            instance: &'a InstanceId,
            metric: &'a MetricDefinition,
            window: &'a SampleWindow,
        ) -> BoxFuture<'a, TapirResult<Vec<Datapoint>>> {
            Box::pin(async move {
                self.queries.lock().unwrap().push(instance.to_string());
                if self.failing.as_deref() == Some(instance.as_str()) {
                    return Err(TapirError::Telemetry {
                        instance: instance.clone(),
                        metric: metric.to_string(),
                        reason: "throttled".to_string(),
                    });
                }
                let values = self.series.get(instance.as_str()).cloned().unwrap_or_default();
                Ok(values
                    .into_iter()
                    .enumerate()
                    .map(|(i, average)| Datapoint {
                        timestamp: window.start + window.period * i as u32,
                        average,
                    })
                    .collect())
            })
        }
    }

    pub(crate) fn test_window() -> SampleWindow {
        SampleWindow::ending_at(
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            Duration::from_secs(20 * 60),
            Duration::from_secs(300),
        )
    }

    fn ids(names: &[&str]) -> Vec<InstanceId> {
        names.iter().map(|n| InstanceId::new(*n)).collect()
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn mean_is_unweighted() {
        assert_eq!(mean(&[10.0, 20.0, 30.0, 40.0]), 25.0);
    }

    #[tokio::test]
    async fn aggregate_averages_samples() {
        let aggregator = MetricAggregator::new(FakeTelemetry::with(vec![(
            "i-1",
            vec![90.0, 100.0, 95.0, 95.0],
        )]));
        let value = aggregator
            .aggregate(&"i-1".into(), &MetricDefinition::ec2_cpu(), &test_window())
            .await
            .unwrap();
        assert_eq!(value, 95.0);
    }

    #[tokio::test]
    async fn aggregate_without_samples_is_zero() {
        let aggregator = MetricAggregator::new(FakeTelemetry::default());
        let value = aggregator
            .aggregate(&"i-new".into(), &MetricDefinition::ec2_cpu(), &test_window())
            .await
            .unwrap();
        assert_eq!(value, 0.0);
    }

    #[tokio::test]
    async fn aggregate_propagates_query_failure() {
        let telemetry = FakeTelemetry {
            failing: Some("i-1".to_string()),
            ..FakeTelemetry::default()
        };
        let aggregator = MetricAggregator::new(telemetry);
        let err = aggregator
            .aggregate(&"i-1".into(), &MetricDefinition::ec2_cpu(), &test_window())
            .await
            .unwrap_err();
        assert!(matches!(err, TapirError::Telemetry { .. }));
    }

    #[tokio::test]
    async fn peer_average_excludes_target() {
        let aggregator = MetricAggregator::new(FakeTelemetry::with(vec![
            ("i-1", vec![99.0]),
            ("i-2", vec![20.0]),
            ("i-3", vec![30.0]),
        ]));
        let members = ids(&["i-1", "i-2", "i-3"]);
        let avg = aggregator
            .peer_average(&"i-1".into(), &members, &MetricDefinition::ec2_cpu(), &test_window())
            .await
            .unwrap();
        assert_eq!(avg, 25.0);
        // The target itself is never queried.
        assert_eq!(aggregator.telemetry().query_count(), 2);
    }

    #[tokio::test]
    async fn peer_average_of_lone_instance_is_zero() {
        let aggregator = MetricAggregator::new(FakeTelemetry::with(vec![("i-1", vec![99.0])]));
        let avg = aggregator
            .peer_average(
                &"i-1".into(),
                &ids(&["i-1"]),
                &MetricDefinition::ec2_cpu(),
                &test_window(),
            )
            .await
            .unwrap();
        assert_eq!(avg, 0.0);
    }
}
