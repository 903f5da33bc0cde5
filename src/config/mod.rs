//! Configuration
//!
//! A single immutable [`RestoreConfig`] is built at startup, from a JSON
//! file ([`RestoreConfig::load`]) with optional command-line overrides
//! ([`RestoreArgs::apply`]), and passed explicitly to the orchestrator.

mod args;
pub mod duration;
mod errors;
mod restore;

pub use args::RestoreArgs;
pub use errors::{ConfigError, ConfigResult};
pub use restore::RestoreConfig;
