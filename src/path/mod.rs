//! Path template compilation and parameter substitution.
//!
//! Templates use `:name` placeholders, e.g. `/user/:id/comments`.
//! This module provides:
//! - Template parsing and rendering ([`PathTemplate`])
//! - A bounded cache of compiled templates ([`PathGenerator`])
//! - The process-wide generator used by the request pipeline ([`generate_path`])
//!
//! # Template Syntax
//!
//! - `:name` is a required placeholder; `name` is one or more of `[A-Za-z0-9_]`.
//! - `:name?` is optional; when its value is missing or null the placeholder is
//!   dropped together with the `/` in front of it.
//! - `\:` produces a literal colon (needed for ports, e.g. `http://host\:8080/`).
//! - A `:` that is not followed by a name character is kept as a literal.

mod error;
mod generator;
mod template;

#[cfg(test)]
mod template_tests;

pub use error::PathError;
pub use generator::{DEFAULT_CACHE_LIMIT, PathGenerator, generate_path};
pub use template::PathTemplate;
