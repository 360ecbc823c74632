//! # secstache
//!
//! Fill Mustache templates with secrets from a secret store.
//!
//! ## Overview
//!
//! A run is a linear pipeline:
//!
//! 1. **Load** - fetch every requested secret through a [`provider::SecretSource`]
//!    and merge the JSON object payloads into one [`loader::SecretMap`]
//! 2. **Render** - substitute the mapping into each template with the
//!    logic-less Mustache engine in [`template`]
//! 3. **Write** - standard output, or `<file>` for every `<file>.mustache`
//!
//! Failures are isolated: a secret that cannot be fetched or parsed is
//! skipped, and a template that fails to render does not stop the others.
//! The run only fails when no secrets were loaded at all, or when the single
//! standard-input template cannot be rendered.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod provider;
pub mod template;

pub use error::{LoadError, RenderError, RunError, SecretFetchError, SecretParseError};
pub use loader::{load_secrets, LoadReport, SecretMap};
pub use pipeline::{run, RunOptions, RunReport};
pub use provider::{MemorySecretSource, SecretSource};
