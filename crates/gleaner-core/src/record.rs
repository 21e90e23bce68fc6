//! The labeled output record emitted by extraction runs

use crate::error::ExtractError;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

/// One item emitted by an extraction run.
///
/// A record is a sequence of labels accumulated by wrapping layers
/// (outermost first) plus a terminal element that is either an extracted
/// value or the error that ended a sub-extractor's stream. An error
/// terminal means producing *this* item failed; it is data for the
/// consumer, not a control-flow signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    labels: Vec<String>,
    result: Result<Value, ExtractError>,
}

impl Record {
    /// Create an unlabeled record carrying an extracted value
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            labels: Vec::new(),
            result: Ok(value.into()),
        }
    }

    /// Create an unlabeled record carrying a failure
    pub fn error(error: ExtractError) -> Self {
        Self {
            labels: Vec::new(),
            result: Err(error),
        }
    }

    /// Prepend a label, making it the new outermost one.
    ///
    /// Each wrapping layer contributes exactly one label, so a record that
    /// passed through `label(...)` around a `Named` reads
    /// `[document label, field name, value]`.
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(0, label.into());
        self
    }

    /// Labels accumulated so far, outermost first
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The terminal element: the extracted value or the failure
    pub fn result(&self) -> &Result<Value, ExtractError> {
        &self.result
    }

    /// Whether the terminal element is a failure
    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }

    /// Decompose into labels and terminal element
    pub fn into_parts(self) -> (Vec<String>, Result<Value, ExtractError>) {
        (self.labels, self.result)
    }
}

/// Serializes as a JSON array: the labels in order, then the terminal
/// element. Errors render as `{"error": "..."}` so line-oriented sinks
/// can keep writing without special-casing failures.
impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.labels.len() + 1))?;
        for label in &self.labels {
            seq.serialize_element(label)?;
        }
        match &self.result {
            Ok(value) => seq.serialize_element(value)?,
            Err(error) => {
                seq.serialize_element(&serde_json::json!({ "error": error.to_string() }))?
            }
        }
        seq.end()
    }
}
