//! Observability setup for Chatter: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
