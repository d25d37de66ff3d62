//! Observability setup for Maum services.

pub mod tracing_setup;
