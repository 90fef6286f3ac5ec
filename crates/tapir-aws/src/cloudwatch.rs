//! Per-instance telemetry from CloudWatch.

use std::time::SystemTime;

use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Dimension, StandardUnit, Statistic};
use tracing::debug;

use tapir_core::{
    BoxFuture, Datapoint, InstanceId, MetricDefinition, SampleWindow, TapirError, TapirResult,
    TelemetrySource,
};

/// Fetches `Average` statistics in percent, keyed by the `InstanceId` dimension.
pub struct CloudWatchTelemetry {
    client: Client,
}

impl CloudWatchTelemetry {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn statistics(
        &self,
        instance: &InstanceId,
        metric: &MetricDefinition,
        window: &SampleWindow,
    ) -> TapirResult<Vec<Datapoint>> {
        let telemetry_error = |reason: String| TapirError::Telemetry {
            instance: instance.clone(),
            metric: metric.to_string(),
            reason,
        };

        let dimension = Dimension::builder()
            .name("InstanceId")
            .value(instance.as_str())
            .build()
            .map_err(|e| telemetry_error(e.to_string()))?;
        let period = i32::try_from(window.period.as_secs())
            .map_err(|_| telemetry_error(format!("period {:?} out of range", window.period)))?;

        let output = self
            .client
            .get_metric_statistics()
            .namespace(&metric.namespace)
            .metric_name(&metric.name)
            .dimensions(dimension)
            .start_time(DateTime::from(window.start))
            .end_time(DateTime::from(window.end))
            .period(period)
            .statistics(Statistic::Average)
            .unit(StandardUnit::Percent)
            .send()
            .await
            .map_err(|e| telemetry_error(DisplayErrorContext(e).to_string()))?;

        let datapoints = to_datapoints(output.datapoints(), window);
        debug!(%instance, %metric, datapoints = datapoints.len(), "metric statistics fetched");
        Ok(datapoints)
    }
}

impl TelemetrySource for CloudWatchTelemetry {
    fn query<'a>(
        &'a self,
        instance: &'a InstanceId,
        metric: &'a MetricDefinition,
        window: &'a SampleWindow,
    ) -> BoxFuture<'a, TapirResult<Vec<Datapoint>>> {
        Box::pin(self.statistics(instance, metric, window))
    }
}

/// Keep datapoints carrying an average, oldest first.
fn to_datapoints(
    raw: &[aws_sdk_cloudwatch::types::Datapoint],
    window: &SampleWindow,
) -> Vec<Datapoint> {
    let mut datapoints: Vec<Datapoint> = raw
        .iter()
        .filter_map(|d| {
            let average = d.average()?;
            let timestamp = match d.timestamp().and_then(|t| SystemTime::try_from(*t).ok()) {
                Some(t) => t,
                None => {
                    debug!(average, "datapoint without usable timestamp, placed at window start");
                    window.start
                }
            };
            Some(Datapoint { timestamp, average })
        })
        .collect();
    datapoints.sort_by_key(|d| d.timestamp);
    datapoints
}
