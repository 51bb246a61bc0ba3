//! HTTP surface modules (router, handlers, middleware).

/// Shared constants and header names.
pub mod constants;
/// Error bodies returned by handlers.
pub mod errors;
/// Health, preset listing, and metrics endpoints.
pub mod health;
/// `POST /obfuscate` handler.
pub mod obfuscate;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
