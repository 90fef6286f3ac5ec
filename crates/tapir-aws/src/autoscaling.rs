//! Group membership from EC2 Auto Scaling.

use aws_sdk_autoscaling::Client;
use aws_sdk_autoscaling::error::DisplayErrorContext;
use aws_sdk_autoscaling::types::AutoScalingInstanceDetails;
use tracing::debug;

use tapir_core::{
    BoxFuture, FleetMember, GroupId, InstanceId, LifecycleState, MembershipSource, TapirError,
    TapirResult,
};

/// Lists every instance in every auto-scaling group of the account/region.
pub struct AutoScalingMembership {
    client: Client,
}

impl AutoScalingMembership {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn describe_all(&self) -> TapirResult<Vec<FleetMember>> {
        let mut pages = self
            .client
            .describe_auto_scaling_instances()
            .into_paginator()
            .send();

        let mut members = Vec::new();
        let mut page_count = 0usize;
        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|e| TapirError::Membership(DisplayErrorContext(e).to_string()))?;
            page_count += 1;
            members.extend(page.auto_scaling_instances().iter().map(to_member));
        }

        debug!(
            pages = page_count,
            instances = members.len(),
            "auto scaling instances described"
        );
        Ok(members)
    }
}

impl MembershipSource for AutoScalingMembership {
    fn list_members(&self) -> BoxFuture<'_, TapirResult<Vec<FleetMember>>> {
        Box::pin(self.describe_all())
    }
}

fn to_member(details: &AutoScalingInstanceDetails) -> FleetMember {
    FleetMember {
        group: GroupId::new(details.auto_scaling_group_name()),
        instance: InstanceId::new(details.instance_id()),
        lifecycle: LifecycleState::parse(details.lifecycle_state()),
    }
}
