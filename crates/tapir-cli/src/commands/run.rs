use std::path::Path;

use anyhow::Context;
use tracing::info;

use tapir_aws::AwsClients;
use tapir_core::ExecutionMode;
use tapir_sandman::{FleetWalker, Invocation, handle};

use super::config;

pub async fn run(
    config_path: Option<&Path>,
    dry_run: bool,
    region: Option<String>,
    event_path: Option<&Path>,
) -> anyhow::Result<()> {
    let config = config::load(config_path)?;
    let mode = ExecutionMode::from_dry_run(dry_run);
    let invocation = read_invocation(event_path)?;

    info!(
        %mode,
        threshold = config.policy.threshold,
        metrics = config.metrics.len(),
        window_minutes = config.window.minutes,
        "sandman starting"
    );

    let clients = AwsClients::from_env(region).await;
    let walker = FleetWalker::new(
        clients.membership,
        clients.telemetry,
        clients.control,
        mode,
        &config,
    );

    let report = handle(&invocation, &walker)
        .await
        .context("sandman run failed")?;

    match report.terminated {
        Some(instance) if mode.is_dry_run() => println!("would terminate {instance} (dry run)"),
        Some(instance) => println!("terminated {instance}"),
        None => println!(
            "no anomaly found ({} groups, {} instances)",
            report.groups_checked, report.instances_evaluated
        ),
    }
    Ok(())
}

/// Build the invocation from an optional event file.
fn read_invocation(path: Option<&Path>) -> anyhow::Result<Invocation> {
    let Some(path) = path else {
        return Ok(Invocation::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading event {}", path.display()))?;
    let event: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing event {}", path.display()))?;

    let request_id = event
        .get("id")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    Ok(Invocation { event, request_id })
}
