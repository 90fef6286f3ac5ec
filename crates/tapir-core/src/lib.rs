pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::{PolicyConfig, SandmanConfig, WindowConfig};
pub use error::{TapirError, TapirResult};
pub use source::{BoxFuture, ComputeControl, MembershipSource, TelemetrySource};
pub use types::*;
