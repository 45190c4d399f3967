//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → profile() resolves the mode's WorkloadProfile
//!     → shared by value with the HTTP server and job runner
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; running without a file is the common case
//! - The mode picks a profile; the file only overrides individual numbers
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_str, ConfigError};
pub use schema::{
    CpuPolicy, ListenerConfig, Mode, ObservabilityConfig, ServiceConfig, WorkloadConfig,
    WorkloadProfile,
};
