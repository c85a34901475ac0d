//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry + slots produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters via the `metrics` facade)
//!
//! Consumers:
//!     → stdout (fmt subscriber, filtered by RUST_LOG or config)
//!     → any metrics recorder installed by the embedding application
//! ```
//!
//! # Design Decisions
//! - Absorbed failures (omitted pools, weight fallbacks) are always logged
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
