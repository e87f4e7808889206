//! Result rendering: the streaming and buffered transcoders.
//!
//! A call's result arrives either as one materialized JSON value or as a
//! framed chunk stream. Both are rendered through the same per-format
//! [`encoder::Encoder`] set into a [`sink::Sink`], optionally filtered by
//! a [`query::ProjectionStage`]. Callers pick the path that matches their
//! result source:
//!
//! - [`transcode_stream`] - incremental, O(1) memory, for framed row sets;
//! - [`transcode_value`] - single write, for materialized responses.

mod buffered;
mod encoder;
mod error;
mod query;
mod sink;
mod streaming;

pub use buffered::transcode_value;
pub use encoder::{DelimitedEncoder, Encoder, JsonEncoder, YamlEncoder};
pub use error::{EncodeError, OutputError, ProjectionError, SinkError, SourceError};
pub use query::{JmespathEvaluator, ProjectionStage, QueryEvaluator};
pub use sink::{Destination, Sink};
pub use streaming::{
    FrameResult, StreamSummary, StreamingTranscoder, CLOSE_FRAME, OPEN_FRAME,
};

use tokio::sync::mpsc;

/// Target output serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// One JSON array (pretty-printed in the buffered path).
    #[default]
    Json,
    /// Newline-joined YAML fragments, no document markers.
    Yaml,
    /// `'`-quoted, comma-delimited rows with a header line.
    Csv,
    /// Unquoted, tab-delimited rows.
    Tsv,
    /// No rendered output; the result is still fully consumed.
    Raw,
    /// Alias of `raw` kept for pipeline compatibility.
    None,
}

impl Encoding {
    /// Encodings that never produce output bytes.
    pub fn is_silent(self) -> bool {
        matches!(self, Encoding::Raw | Encoding::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Yaml => "yaml",
            Encoding::Csv => "csv",
            Encoding::Tsv => "tsv",
            Encoding::Raw => "raw",
            Encoding::None => "none",
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select the encoder for a visible encoding; `None` for the silent ones.
fn encoder_for(encoding: Encoding) -> Option<Box<dyn Encoder>> {
    match encoding {
        Encoding::Json => Some(Box::new(JsonEncoder)),
        Encoding::Yaml => Some(Box::new(YamlEncoder)),
        Encoding::Csv => Some(Box::new(DelimitedEncoder::csv())),
        Encoding::Tsv => Some(Box::new(DelimitedEncoder::tsv())),
        Encoding::Raw | Encoding::None => None,
    }
}

/// Render a framed result stream.
///
/// For silent encodings the stream is drained without opening the sink and
/// the outcome follows the source's own outcome.
pub async fn transcode_stream(
    encoding: Encoding,
    destination: &Destination,
    stage: ProjectionStage,
    frames: mpsc::Receiver<FrameResult>,
) -> Result<StreamSummary, OutputError> {
    let Some(encoder) = encoder_for(encoding) else {
        streaming::drain(frames).await?;
        return Ok(StreamSummary::default());
    };
    let sink = Sink::open(destination)?;
    StreamingTranscoder::new(encoder, stage, sink).run(frames).await
}
