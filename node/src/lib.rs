//! Validation node: runs the [`agij_validation::ValidationModule`] as a
//! long-lived service.
//!
//! The node:
//! - Loads TOML configuration and turns it into a module (or restores one
//!   from a snapshot)
//! - Installs structured logging
//! - Serialises every operation through a single-writer tokio task
//! - Tracks selections, votes, slashes, and cache behaviour in Prometheus
//! - Fans emitted events out to in-process listeners

pub mod config;
pub mod error;
pub mod event_bus;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod service;
pub mod tracing_spans;

pub use config::{AliasEntry, IdentitySettings, NodeConfig, ValidatorEntry};
pub use error::NodeError;
pub use event_bus::EventBus;
pub use logging::{init_logging, LogFormat};
pub use metrics::ValidationMetrics;
pub use node::{build_module, load_or_build, load_snapshot, save_snapshot, IdentityServices};
pub use service::{Command, JobView, Reply, RevealRequest, ValidationHandle, ValidationService};
