//! # Error Types
//!
//! Error taxonomy for loading secrets, rendering templates and driving a run.
//!
//! Only [`RunError`] ends a run. Fetch, parse and per-file render failures are
//! isolated to their own identifier or file and reported.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reaching the secret store for one identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretFetchError {
    #[error("access denied to secret '{key}': {message}")]
    AccessDenied { key: String, message: String },

    #[error("secret '{key}' not found")]
    NotFound { key: String },

    #[error("secret '{key}' has no string value")]
    NoSecretString { key: String },

    #[error("timed out fetching secret '{key}'")]
    Timeout { key: String },

    #[error("network error fetching secret '{key}': {message}")]
    Network { key: String, message: String },

    #[error("failed to fetch secret '{key}': {message}")]
    Other { key: String, message: String },
}

/// Secret payload is not a JSON object
#[derive(Debug, Error)]
pub enum SecretParseError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },
}

/// Per-identifier load failure
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid secret identifier '{identifier}': secret name is empty")]
    InvalidIdentifier { identifier: String },

    #[error(transparent)]
    Fetch(#[from] SecretFetchError),

    #[error("failed to parse secret payload: {0}")]
    Parse(#[from] SecretParseError),
}

/// Malformed template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unclosed tag on line {line}")]
    UnclosedTag { line: usize },

    #[error("empty tag on line {line}")]
    EmptyTag { line: usize },

    #[error("section '{name}' opened on line {line} is never closed")]
    UnclosedSection { name: String, line: usize },

    #[error("closing tag '{name}' on line {line} has no open section")]
    UnexpectedClose { name: String, line: usize },

    #[error("closing tag '{found}' on line {line} does not match open section '{expected}'")]
    MismatchedClose {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("invalid set-delimiter tag on line {line}")]
    InvalidDelimiters { line: usize },
}

/// Template rendering failure
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("key '{name}' not found (line {line})")]
    MissingKey { name: String, line: usize },

    #[error("partial '{name}' not found")]
    MissingPartial { name: String },

    #[error("partial '{name}' exceeds the maximum nesting depth of {depth}")]
    PartialDepth { name: String, depth: usize },

    #[error("invalid template: {0}")]
    Parse(#[from] ParseError),
}

/// Failure that terminates the whole run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Can not process any templates: No secrets were loaded.")]
    NoSecretsLoaded,

    #[error("Failed to render template: {0}")]
    Render(#[from] RenderError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Failure confined to a single template file
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to render {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
