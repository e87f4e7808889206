//! Command implementations.
//!
//! Each command is thin glue: resolve identifiers, build the request, hand
//! the response to the transcoder. All rendering decisions live in
//! [`OutputOpts`], assembled once from the global CLI flags.

use anyhow::{Context, Result};
use beacon_core::output::{self, Destination, Encoding, ProjectionStage};
use serde_json::Value;
use std::path::PathBuf;

pub mod dataset;
pub mod report;
pub mod rest;
pub mod workspace;

/// Rendering options shared by every command.
#[derive(Clone)]
pub struct OutputOpts {
    pub encoding: Encoding,
    pub destination: Destination,
    pub stage: ProjectionStage,
}

impl OutputOpts {
    pub fn new(encoding: Encoding, output_file: Option<PathBuf>, query: Option<String>) -> Self {
        Self {
            encoding,
            destination: output_file.map(Destination::File).unwrap_or_default(),
            stage: ProjectionStage::jmespath(query),
        }
    }

    /// Buffered rendering of one materialized response body.
    pub fn render(&self, value: Value) -> Result<()> {
        output::transcode_value(value, self.encoding, &self.destination, &self.stage)
            .context("failed to render output")
    }
}

/// Unwrap the OData-style list envelope so collections render as flat rows.
pub(crate) fn rows_of(mut body: Value) -> Value {
    match body.get_mut("value") {
        Some(rows) => rows.take(),
        None => body,
    }
}
