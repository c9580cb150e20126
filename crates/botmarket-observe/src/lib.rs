//! Observability setup for the botmarket services.

pub mod tracing_setup;
