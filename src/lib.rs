//! reqflow: a thin HTTP request pipeline
//!
//! Turns request descriptions (method, URL template, parameters, payload,
//! headers, timeout) into cold, cancellable calls over a pluggable transport,
//! with path template substitution, normalized errors, lifecycle hooks and
//! predicate-driven retries.

pub mod client;
pub mod config;
pub mod params;
pub mod path;
