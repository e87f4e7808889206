//! Per-format record encoders.
//!
//! One encoder is selected at construction time and drives every write for
//! the rest of the invocation: stream prologue/epilogue, the optional
//! header, the record bytes themselves, and the separator inserted before
//! every record after the first. Encoders are stateless; header-once and
//! record-count bookkeeping live in the transcoder.

use serde_json::Value;

use super::error::EncodeError;

/// Byte-level contract of one target format.
pub trait Encoder: Send {
    /// Bytes written once before the first batch opens.
    fn prologue(&self) -> &'static [u8] {
        b""
    }

    /// Bytes written once after the stream ends cleanly.
    fn epilogue(&self) -> &'static [u8] {
        b""
    }

    /// Bytes inserted before a record when at least one record was already
    /// emitted, including across batch boundaries.
    fn separator(&self) -> &'static [u8];

    /// Header bytes derived from the first emitted record, or `None` for
    /// formats without a header. Emitted at most once per whole stream.
    fn header(&self, first: &Value) -> Option<Vec<u8>> {
        let _ = first;
        None
    }

    /// Serialize one record.
    fn encode(&self, element: &Value) -> Result<Vec<u8>, EncodeError>;
}

/// Compact JSON records inside one outer array: `[` r `,` r `]`.
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn prologue(&self) -> &'static [u8] {
        b"["
    }

    fn epilogue(&self) -> &'static [u8] {
        b"]"
    }

    fn separator(&self) -> &'static [u8] {
        b","
    }

    fn encode(&self, element: &Value) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(element)?)
    }
}

/// One YAML list-item fragment per record, newline-joined, no document
/// markers.
pub struct YamlEncoder;

impl Encoder for YamlEncoder {
    fn separator(&self) -> &'static [u8] {
        b"\n"
    }

    fn encode(&self, element: &Value) -> Result<Vec<u8>, EncodeError> {
        // Serializing the one-element sequence yields the `- key: value`
        // list form, so concatenated records read as one YAML sequence.
        let fragment = serde_yaml::to_string(&[element])?;
        Ok(fragment.trim_end_matches('\n').as_bytes().to_vec())
    }
}

/// Delimiter-separated rows covering both CSV and TSV.
///
/// CSV quotes string fields with `'` (inner quotes doubled) and uses `,`;
/// TSV uses `\t` with no quoting and no escaping. Field order follows the
/// record's own key order; the schema is assumed homogeneous within one
/// stream, so every row lines up with the header taken from the first
/// record.
pub struct DelimitedEncoder {
    delimiter: char,
    quote: Option<char>,
}

impl DelimitedEncoder {
    pub fn csv() -> Self {
        Self {
            delimiter: ',',
            quote: Some('\''),
        }
    }

    pub fn tsv() -> Self {
        Self {
            delimiter: '\t',
            quote: None,
        }
    }

    fn format_field(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.quote_field(s),
            // Nested values are inlined as compact JSON and treated as text.
            nested => self.quote_field(&nested.to_string()),
        }
    }

    fn quote_field(&self, text: &str) -> String {
        match self.quote {
            Some(q) => {
                let doubled = q.to_string().repeat(2);
                format!("{q}{}{q}", text.replace(q, &doubled))
            }
            None => text.to_string(),
        }
    }
}

impl Encoder for DelimitedEncoder {
    fn separator(&self) -> &'static [u8] {
        b"\n"
    }

    fn header(&self, first: &Value) -> Option<Vec<u8>> {
        if self.quote.is_none() {
            // TSV carries no header, matching its no-decoration contract.
            return None;
        }
        let object = first.as_object()?;
        let mut line = object
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string());
        line.push('\n');
        Some(line.into_bytes())
    }

    fn encode(&self, element: &Value) -> Result<Vec<u8>, EncodeError> {
        let fields: Vec<String> = match element {
            Value::Object(map) => map.values().map(|v| self.format_field(v)).collect(),
            Value::Array(items) => items.iter().map(|v| self.format_field(v)).collect(),
            scalar => vec![self.format_field(scalar)],
        };
        Ok(fields.join(&self.delimiter.to_string()).into_bytes())
    }
}
