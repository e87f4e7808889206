//! Streaming result transcoder.
//!
//! Drives one [`Encoder`] + [`ProjectionStage`] + [`Sink`] from a framed
//! chunk stream. Frames arrive over an mpsc channel in arrival order; the
//! channel closing is the end-of-stream signal and an `Err` item is the
//! distinct source-error signal. The transcoder holds O(1) state relative to
//! stream length: the state value, two counters, and at most one frame.
//!
//! Failure contract (the part worth reading twice): framing and projection
//! failures are fatal and leave the document visibly unclosed, while a
//! record that fails to encode is logged and skipped. A truncated, invalid
//! output is preferred over a plausible-looking wrong one.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use super::encoder::Encoder;
use super::error::{OutputError, SourceError};
use super::query::ProjectionStage;
use super::sink::Sink;

/// Literal frame opening one batch of elements.
pub const OPEN_FRAME: &str = "[";
/// Literal frame closing a batch.
pub const CLOSE_FRAME: &str = "]";

/// One item of the upstream framing contract.
pub type FrameResult = Result<String, SourceError>;

/// Counters reported after a stream renders cleanly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Records written, net of projection suppression.
    pub records: u64,
    /// Open/Close batches consumed.
    pub batches: u64,
}

/// Lifecycle of one result stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TranscoderState {
    /// No batch opened yet; the prologue is still unwritten.
    AwaitingOpen,
    /// Inside an Open..Close batch, accepting element frames.
    Emitting,
    /// A batch closed; a further Open resumes the same document.
    Closed,
}

/// State machine converting a framed element stream into encoded bytes.
///
/// Owned by a single invocation; consumed by [`StreamingTranscoder::run`].
pub struct StreamingTranscoder {
    encoder: Box<dyn Encoder>,
    stage: ProjectionStage,
    sink: Sink,
    state: TranscoderState,
    records: u64,
    batches: u64,
}

impl StreamingTranscoder {
    pub fn new(encoder: Box<dyn Encoder>, stage: ProjectionStage, sink: Sink) -> Self {
        Self {
            encoder,
            stage,
            sink,
            state: TranscoderState::AwaitingOpen,
            records: 0,
            batches: 0,
        }
    }

    /// Consume the frame channel to completion.
    ///
    /// On a source error or any fatal condition, writing stops immediately
    /// and the document is not closed.
    pub async fn run(
        mut self,
        mut frames: mpsc::Receiver<FrameResult>,
    ) -> Result<StreamSummary, OutputError> {
        while let Some(frame) = frames.recv().await {
            let frame = frame.map_err(|err| OutputError::Source(err.to_string()))?;
            self.accept(&frame)?;
        }
        self.finish()
    }

    /// Process one frame.
    pub fn accept(&mut self, frame: &str) -> Result<(), OutputError> {
        match frame.trim() {
            OPEN_FRAME => self.open(),
            CLOSE_FRAME => self.close(),
            element => self.element(element),
        }
    }

    fn open(&mut self) -> Result<(), OutputError> {
        match self.state {
            TranscoderState::AwaitingOpen => {
                self.sink.append(self.encoder.prologue())?;
            }
            TranscoderState::Closed => {
                // New batch of a paginated stream: batches concatenate into
                // one document. Header and record counters keep running, so
                // the next element bridges the batches with its separator.
            }
            TranscoderState::Emitting => {
                return Err(OutputError::Framing(
                    "open marker received while a batch is already open".into(),
                ));
            }
        }
        self.state = TranscoderState::Emitting;
        self.batches += 1;
        trace!(batch = self.batches, "batch opened");
        Ok(())
    }

    fn close(&mut self) -> Result<(), OutputError> {
        match self.state {
            TranscoderState::Emitting => {
                self.state = TranscoderState::Closed;
                Ok(())
            }
            TranscoderState::AwaitingOpen | TranscoderState::Closed => Err(OutputError::Framing(
                "close marker received without a matching open".into(),
            )),
        }
    }

    fn element(&mut self, raw: &str) -> Result<(), OutputError> {
        match self.state {
            TranscoderState::Emitting => {}
            TranscoderState::AwaitingOpen => {
                return Err(OutputError::Framing(
                    "element frame received before the open marker".into(),
                ));
            }
            TranscoderState::Closed => {
                return Err(OutputError::Framing(
                    "element frame received after the close marker".into(),
                ));
            }
        }

        // Each frame must be one self-contained JSON value; anything else is
        // a defect in the upstream framing layer, not a bad record.
        let element: Value = serde_json::from_str(raw)
            .map_err(|err| OutputError::Framing(format!("unparseable element frame: {err}")))?;

        let Some(projected) = self.stage.project_element(element)? else {
            trace!("element suppressed by projection");
            return Ok(());
        };

        // Encode before touching the sink so a failed record leaves no
        // dangling header or separator behind.
        let encoded = match self.encoder.encode(&projected) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, record = self.records, "skipping record that failed to encode");
                return Ok(());
            }
        };

        if self.records == 0 {
            if let Some(header) = self.encoder.header(&projected) {
                self.sink.append(&header)?;
            }
        } else {
            self.sink.append(self.encoder.separator())?;
        }
        self.sink.append(&encoded)?;
        self.records += 1;
        Ok(())
    }

    /// Handle end-of-stream. The epilogue is committed only here: a Close
    /// marker alone cannot, because a later Open may still extend the same
    /// document, and for JSON the total output must stay one valid array.
    fn finish(mut self) -> Result<StreamSummary, OutputError> {
        match self.state {
            TranscoderState::Closed => {
                self.sink.append(self.encoder.epilogue())?;
                self.sink.flush()?;
                Ok(StreamSummary {
                    records: self.records,
                    batches: self.batches,
                })
            }
            TranscoderState::AwaitingOpen => Err(OutputError::Framing(
                "stream ended before the open marker".into(),
            )),
            TranscoderState::Emitting => Err(OutputError::Framing(
                "stream ended before the close marker".into(),
            )),
        }
    }
}

/// Fully drain a frame channel without producing bytes, reporting only the
/// source's own outcome. Used for the `raw` and `none` encodings.
pub(crate) async fn drain(mut frames: mpsc::Receiver<FrameResult>) -> Result<(), OutputError> {
    while let Some(frame) = frames.recv().await {
        frame.map_err(|err| OutputError::Source(err.to_string()))?;
    }
    Ok(())
}
