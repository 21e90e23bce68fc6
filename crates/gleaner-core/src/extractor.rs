//! The labeling and fault-isolating dispatch layer
//!
//! An [`Extractor`] is invoked once per input document and produces a
//! lazy stream of [`Record`]s. Three wrappers combine extractors:
//!
//! - [`Chained`] runs several extractors against the same rewindable
//!   input, concatenating their output;
//! - [`Named`] runs a set of field extractors, tagging every record with
//!   the field's registration name;
//! - [`label`] computes a per-input label (typically the document URL)
//!   and prefixes it to every record, or suppresses the input entirely.
//!
//! Failures never cross sub-extractor boundaries. A sub-extractor that
//! fails when invoked, or partway through its stream, contributes one
//! error-valued record; every other sub-extractor still runs to
//! completion. One bad field extractor yields one error record, not a
//! failed document.

use crate::error::ExtractError;
use crate::guard::Guard;
use crate::record::Record;
use crate::source::Rewind;
use serde_json::Value;
use std::fmt;
use std::iter;
use tracing::{debug, warn};

/// The lazy record stream produced by one extraction run
pub type Records<'a> = Box<dyn Iterator<Item = Record> + 'a>;

/// Anything that can be run against an input to produce records.
///
/// The outer `Result` is the call-time channel: an extractor that fails
/// before producing its stream returns `Err`, and the dispatch layer
/// wrapping it converts that into an error record. Failures *during* the
/// stream travel inside it, as error-valued records.
///
/// Extractors are built once and reused across many inputs; `extract`
/// takes `&self` and must not retain per-call state.
pub trait Extractor<I: ?Sized>: Send + Sync {
    /// Run against one input, producing a lazy stream of records
    fn extract<'a>(&'a self, input: &'a I) -> Result<Records<'a>, ExtractError>;
}

/// Adapter returned by [`value`]
pub struct ValueFn<F> {
    call: F,
}

/// Adapt a function producing one value into an extractor.
///
/// The function's `Err` is a call-time failure: under [`Named`] it
/// becomes one `(name, error)` record, under [`Chained`] one unlabeled
/// error record.
pub fn value<F>(call: F) -> ValueFn<F> {
    ValueFn { call }
}

impl<I, F, V> Extractor<I> for ValueFn<F>
where
    I: ?Sized,
    F: Fn(&I) -> Result<V, ExtractError> + Send + Sync,
    V: Into<Value>,
{
    fn extract<'a>(&'a self, input: &'a I) -> Result<Records<'a>, ExtractError> {
        let value = (self.call)(input)?;
        Ok(Box::new(iter::once(Record::value(value))))
    }
}

/// Adapter returned by [`values`]
pub struct ValuesFn<F> {
    call: F,
}

/// Adapt a function producing a stream of values into an extractor.
///
/// The stream is run through [`Guard`]: values pass through until the
/// first `Err`, which becomes the stream's final record. Values produced
/// before the failure are kept.
pub fn values<F>(call: F) -> ValuesFn<F> {
    ValuesFn { call }
}

impl<I, F, It, V> Extractor<I> for ValuesFn<F>
where
    I: ?Sized,
    F: Fn(&I) -> It + Send + Sync,
    It: IntoIterator<Item = Result<V, ExtractError>>,
    It::IntoIter: 'static,
    V: Into<Value> + 'static,
{
    fn extract<'a>(&'a self, input: &'a I) -> Result<Records<'a>, ExtractError> {
        let stream = (self.call)(input).into_iter();
        Ok(Box::new(Guard::new(stream).map(|item| match item {
            Ok(value) => Record::value(value),
            Err(error) => Record::error(error),
        })))
    }
}

/// Extractor wrapper returned by [`label`]
pub struct Labelled<L, E> {
    labeller: L,
    inner: E,
}

/// Wrap an extractor so every record it emits is prefixed with a label
/// computed from the input.
///
/// The labeller runs once per input. Returning `None` suppresses the
/// input entirely: the wrapped extractor is not invoked and the stream
/// is empty. Returning `Some(label)` prepends the label to each record
/// the wrapped extractor yields; nested wrappers each contribute their
/// own label, outermost first, without flattening.
///
/// A call-time failure of the wrapped extractor becomes a single labeled
/// error record.
pub fn label<L, E>(labeller: L, inner: E) -> Labelled<L, E> {
    Labelled { labeller, inner }
}

impl<I, L, S, E> Extractor<I> for Labelled<L, E>
where
    I: ?Sized,
    L: Fn(&I) -> Option<S> + Send + Sync,
    S: Into<String>,
    E: Extractor<I>,
{
    fn extract<'a>(&'a self, input: &'a I) -> Result<Records<'a>, ExtractError> {
        let label: String = match (self.labeller)(input) {
            Some(label) => label.into(),
            None => {
                debug!("no label for input, suppressing output");
                return Ok(Box::new(iter::empty()));
            }
        };
        let records = match self.inner.extract(input) {
            Ok(records) => records,
            Err(error) => {
                warn!("labelled extractor failed: {}", error);
                Box::new(iter::once(Record::error(error))) as Records<'a>
            }
        };
        Ok(Box::new(
            records.map(move |record| record.labelled(label.clone())),
        ))
    }
}

/// Runs an ordered sequence of extractors against the same input,
/// concatenating their output.
///
/// The input is rewound before every sub-extractor, uniformly, including
/// the first, so each one observes the input from its start no matter
/// how much an earlier one consumed. This is why the input must
/// implement [`Rewind`].
///
/// A sub-extractor that fails when invoked contributes one unlabeled
/// error record in place of its output; the remaining sub-extractors
/// still run.
pub struct Chained<I: ?Sized> {
    extractors: Vec<Box<dyn Extractor<I>>>,
}

impl<I: ?Sized> Chained<I> {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Append an extractor, builder style
    pub fn with(mut self, extractor: impl Extractor<I> + 'static) -> Self {
        self.add(extractor);
        self
    }

    /// Append an extractor
    pub fn add(&mut self, extractor: impl Extractor<I> + 'static) {
        self.extractors.push(Box::new(extractor));
    }

    /// Number of registered extractors
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl<I: ?Sized> Default for Chained<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized> fmt::Debug for Chained<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chained({} extractors)", self.extractors.len())
    }
}

impl<I> Extractor<I> for Chained<I>
where
    I: Rewind + ?Sized,
{
    fn extract<'a>(&'a self, input: &'a I) -> Result<Records<'a>, ExtractError> {
        Ok(Box::new(self.extractors.iter().flat_map(move |extractor| {
            input.rewind();
            match extractor.extract(input) {
                Ok(records) => records,
                Err(error) => {
                    warn!("chained extractor failed: {}", error);
                    Box::new(iter::once(Record::error(error))) as Records<'a>
                }
            }
        })))
    }
}

/// An ordered mapping from field name to extractor.
///
/// Calling a `Named` runs every registered extractor against the input,
/// in registration order, prefixing each record with the extractor's
/// name. Draining is fully sequential: one sub-extractor is exhausted
/// before the next is invoked.
///
/// Failure of one named extractor never prevents the others from
/// running. A call-time failure becomes one `(name, error)` record; a
/// mid-stream failure keeps the values produced so far and appends one
/// `(name, error)` record (see [`values`]).
///
/// Names are not required to be unique; order matters only for output
/// ordering.
pub struct Named<I: ?Sized> {
    extractors: Vec<(String, Box<dyn Extractor<I>>)>,
}

impl<I: ?Sized> Named<I> {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Register an extractor under a name, builder style
    pub fn with(
        mut self,
        name: impl Into<String>,
        extractor: impl Extractor<I> + 'static,
    ) -> Self {
        self.add(name, extractor);
        self
    }

    /// Register an extractor under a name
    pub fn add(&mut self, name: impl Into<String>, extractor: impl Extractor<I> + 'static) {
        self.extractors.push((name.into(), Box::new(extractor)));
    }

    /// Number of registered extractors
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether no extractors are registered
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl<I: ?Sized> Default for Named<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized> fmt::Debug for Named<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .extractors
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        write!(f, "Named{:?}", names)
    }
}

impl<I: ?Sized> Extractor<I> for Named<I> {
    fn extract<'a>(&'a self, input: &'a I) -> Result<Records<'a>, ExtractError> {
        Ok(Box::new(self.extractors.iter().flat_map(
            move |(name, extractor)| {
                let records = match extractor.extract(input) {
                    Ok(records) => records,
                    Err(error) => {
                        warn!("named extractor '{}' failed: {}", name, error);
                        Box::new(iter::once(Record::error(error))) as Records<'a>
                    }
                };
                records.map(move |record| record.labelled(name.as_str()))
            },
        )))
    }
}
