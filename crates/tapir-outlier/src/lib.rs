//! tapir-outlier: decides whether an instance is a runaway outlier.
//!
//! # Decision Rule
//!
//! ```text
//! current  = instance's aggregated metric over the window
//! peers    = mean of its siblings' aggregated metric (0.0 when alone)
//!
//! outlier iff current > threshold
//!         and current - peers >= 50.0
//!         and peers != 0.0
//! ```
//!
//! A fleet-wide spike raises `peers` along with `current`, so it never
//! satisfies the margin. A group of one has `peers == 0.0` and is never
//! flagged. The rule is a pure function of its inputs; whether a flagged
//! instance is actually terminated is decided elsewhere.

pub mod decision;

pub use decision::{Assessment, PEER_MARGIN, assess, classify, decide, log_assessment};
