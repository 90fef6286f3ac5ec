//! Instance termination through EC2.

use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::DisplayErrorContext;
use tracing::debug;

use tapir_core::{BoxFuture, ComputeControl, InstanceId, TapirError, TapirResult};

pub struct Ec2Control {
    client: Client,
}

impl Ec2Control {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn terminate_one(&self, instance: &InstanceId) -> TapirResult<()> {
        let output = self
            .client
            .terminate_instances()
            .instance_ids(instance.as_str())
            .send()
            .await
            .map_err(|e| TapirError::Termination {
                instance: instance.clone(),
                reason: DisplayErrorContext(e).to_string(),
            })?;

        for change in output.terminating_instances() {
            debug!(
                instance = ?change.instance_id(),
                previous = ?change.previous_state().and_then(|s| s.name()),
                current = ?change.current_state().and_then(|s| s.name()),
                "instance state change"
            );
        }
        Ok(())
    }
}

impl ComputeControl for Ec2Control {
    fn terminate<'a>(&'a self, instance: &'a InstanceId) -> BoxFuture<'a, TapirResult<()>> {
        Box::pin(self.terminate_one(instance))
    }
}
