//! tapir-metrics: reducing telemetry to comparable numbers.
//!
//! Turns the raw per-period samples of a telemetry source into a single
//! value per instance, and compares an instance against its siblings.
//!
//! # Architecture
//!
//! ```text
//! MetricAggregator<T: TelemetrySource>
//!   ├── aggregate()    → mean of per-period averages (0.0 when empty)
//!   └── peer_average() → mean of aggregate() over siblings (0.0 when alone)
//!
//! GroupReadings
//!   └── collect() → one aggregate() per member, peer averages from the cache
//! ```

pub mod aggregator;
pub mod peer;

pub use aggregator::{MetricAggregator, mean};
pub use peer::{GroupReadings, mean_excluding};
