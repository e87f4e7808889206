//! Buffered (single-shot) result transcoder.
//!
//! Takes one fully materialized value, applies the single-shot projection,
//! and writes the whole document in one append-plus-flush. No separator or
//! header bookkeeping: if encoding fails here nothing has been committed,
//! so the failure is fatal to the attempt.

use serde::Serialize;
use serde_json::Value;

use super::encoder::{DelimitedEncoder, Encoder};
use super::error::{EncodeError, OutputError};
use super::query::ProjectionStage;
use super::sink::{Destination, Sink};
use super::Encoding;

/// Render one materialized value to the destination.
///
/// `raw` and `none` produce no bytes at all; a projection that yields no
/// result writes nothing and still succeeds.
pub fn transcode_value(
    value: Value,
    encoding: Encoding,
    destination: &Destination,
    stage: &ProjectionStage,
) -> Result<(), OutputError> {
    if encoding.is_silent() {
        return Ok(());
    }

    let Some(projected) = stage.project_collection(value)? else {
        return Ok(());
    };

    let bytes = match encoding {
        Encoding::Json => pretty_json(&projected)?,
        Encoding::Yaml => serde_yaml::to_string(&projected)
            .map_err(EncodeError::from)?
            .into_bytes(),
        Encoding::Csv => delimited_document(&projected, &DelimitedEncoder::csv())?,
        Encoding::Tsv => delimited_document(&projected, &DelimitedEncoder::tsv())?,
        Encoding::Raw | Encoding::None => return Ok(()),
    };

    let mut sink = Sink::open(destination)?;
    sink.write_once(&bytes)?;
    Ok(())
}

/// Whole-value pretty JSON with the historical 1-space indent.
fn pretty_json(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::with_capacity(128);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Render a flat homogeneous sequence as one delimited document: header
/// (when the format has one) plus one row per element. A bare object is
/// accepted as a one-row sequence.
fn delimited_document(value: &Value, encoder: &DelimitedEncoder) -> Result<Vec<u8>, EncodeError> {
    let rows: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut out = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if index == 0 {
            if let Some(header) = encoder.header(row) {
                out.extend_from_slice(&header);
            }
        } else {
            out.extend_from_slice(encoder.separator());
        }
        out.extend_from_slice(&encoder.encode(row)?);
    }
    Ok(out)
}
