//! Error taxonomy for the result transcoders.
//!
//! The split matters more than the variants: framing, projection and sink
//! failures are fatal to an invocation, while a record that fails to encode
//! mid-stream is logged and skipped. The buffered path has nothing committed
//! when encoding fails, so there the same error is fatal to the attempt.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal and recoverable failures raised while rendering a result.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The Open/Element/Close chunk contract was broken. Always fatal: the
    /// stream halts and no synthetic closing bytes are written.
    #[error("framing violation: {0}")]
    Framing(String),

    /// Query projection failed. Fatal for the remainder of the stream.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// A value could not be serialized. Only surfaced from the buffered
    /// path; the streaming path logs and skips the record instead.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The destination could not be written.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The result source failed mid-stream. Emission stops without closing
    /// the document; already-written bytes are left as-is.
    #[error("result source failed: {0}")]
    Source(String),
}

/// A single record (or, in the buffered path, the whole value) could not be
/// serialized into the target encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Destination write failure.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),

    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The external query evaluator rejected an expression or failed to apply it.
#[derive(Debug, Error)]
#[error("query projection '{expression}' failed: {message}")]
pub struct ProjectionError {
    /// The expression as supplied by the caller.
    pub expression: String,
    /// Evaluator-reported reason.
    pub message: String,
}

impl ProjectionError {
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }
}

/// Error produced by the upstream result source and forwarded through the
/// frame channel, distinct from channel closure (which signals end-of-stream).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
