//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → command-line overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ManagerConfig (validated, immutable)
//!     → sections handed to each subsystem constructor
//! ```
//!
//! # Design Decisions
//! - No process-wide globals: every subsystem receives its section explicitly
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, read_config, ConfigError};
pub use schema::{
    AdminConfig, ControlPlaneConfig, DiscoveryConfig, ListenerConfig, LogFormat, ManagerConfig,
    ObservabilityConfig, ReconcileConfig,
};
pub use validation::{validate_config, ValidationError};
