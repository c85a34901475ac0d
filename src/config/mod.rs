//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → DataSourceConfig shared with the registry (optionally via ArcSwap)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A missing default data source is still representable; the registry
//!   reports it per request instead of refusing to start

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::RouterConfig;
pub use schema::DataSourceConfig;
pub use schema::PoolConfig;
pub use schema::ObservabilityConfig;
pub use schema::RawAttribute;
