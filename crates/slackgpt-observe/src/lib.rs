//! Observability for SlackGPT: tracing subscriber setup with optional log
//! file output and OpenTelemetry span export.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, shutdown_tracing, LogOptions, TracingError};
