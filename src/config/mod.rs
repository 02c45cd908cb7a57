//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AnalyzerConfig (validated, immutable)
//!     → shared via Arc with the analyzer and its collaborators
//! ```
//!
//! # Design Decisions
//! - Config is an explicit value handed to the analyzer, never global
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AnalyzerConfig;
pub use schema::ClientConfig;
pub use schema::LimitsConfig;
pub use schema::ObservabilityConfig;
pub use schema::RobotsConfig;
pub use schema::StorageConfig;
