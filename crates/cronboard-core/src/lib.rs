//! `cronboard-core` — configuration, shared errors and catalog data types.
//!
//! Every other crate in the workspace depends on this one; it has no
//! knowledge of persistence or job execution.

pub mod config;
pub mod error;
pub mod types;

pub use config::CronboardConfig;
pub use error::{CronboardError, Result};
pub use types::JobDescriptor;
