//! Shared utilities.

pub mod bounded;
pub mod telemetry;

pub use bounded::BoundedQueue;
pub use telemetry::init_tracing;
