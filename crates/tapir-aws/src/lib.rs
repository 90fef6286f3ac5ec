//! tapir-aws: AWS implementations of the sandman collaborator traits.
//!
//! | trait              | adapter                 | API                           |
//! |--------------------|-------------------------|-------------------------------|
//! | `MembershipSource` | `AutoScalingMembership` | DescribeAutoScalingInstances  |
//! | `TelemetrySource`  | `CloudWatchTelemetry`   | GetMetricStatistics (Average) |
//! | `ComputeControl`   | `Ec2Control`            | TerminateInstances            |
//!
//! SDK errors are flattened into `TapirError` with their full context. No
//! retries are added on top of the SDK's own retry policy.

pub mod autoscaling;
pub mod cloudwatch;
pub mod ec2;

pub use autoscaling::AutoScalingMembership;
pub use cloudwatch::CloudWatchTelemetry;
pub use ec2::Ec2Control;

use aws_config::{BehaviorVersion, Region};
use tracing::debug;

/// The three adapters built from one shared AWS configuration.
pub struct AwsClients {
    pub membership: AutoScalingMembership,
    pub telemetry: CloudWatchTelemetry,
    pub control: Ec2Control,
}

impl AwsClients {
    /// Load credentials and region from the environment, optionally
    /// overriding the region.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;

        debug!(region = ?config.region(), "aws config loaded");

        Self {
            membership: AutoScalingMembership::new(aws_sdk_autoscaling::Client::new(&config)),
            telemetry: CloudWatchTelemetry::new(aws_sdk_cloudwatch::Client::new(&config)),
            control: Ec2Control::new(aws_sdk_ec2::Client::new(&config)),
        }
    }
}
