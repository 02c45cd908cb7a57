//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (fetch, check and note counters, fetch latency)
//!
//! Consumers:
//!     → stderr via the fmt layer
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Events carry fields (uri, check, status, error), not formatted text
//! - Metrics are recorded through the `metrics` facade; without an installed
//!   recorder they are no-ops

pub mod logging;
pub mod metrics;
