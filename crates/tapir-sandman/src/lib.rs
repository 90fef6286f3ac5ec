//! tapir-sandman: self-healing for auto-scaled fleets.
//!
//! Finds the first in-service instance whose load is far above both a fixed
//! threshold and the rest of its auto-scaling group, and terminates it so the
//! group replaces it. Meant to be run periodically; nothing is kept between
//! runs.
//!
//! # Architecture
//!
//! ```text
//! handle(Invocation)
//!   └── FleetWalker::run()
//!         ├── MembershipSource::list_members() → Fleet (in-service only)
//!         ├── per group, per metric: GroupReadings::collect()
//!         │     └── MetricAggregator → TelemetrySource::query()
//!         ├── tapir_outlier::assess() per instance
//!         └── TerminationActuator::terminate() at most once
//!               └── ComputeControl::terminate() (skipped in dry-run)
//! ```
//!
//! # Failure
//!
//! Any collaborator error aborts the run and is returned to the caller.
//! Nothing is retried here; the next scheduled run is the retry.

pub mod actuator;
pub mod invocation;
pub mod walker;

pub use actuator::{Termination, TerminationActuator};
pub use invocation::{Invocation, handle};
pub use walker::FleetWalker;
