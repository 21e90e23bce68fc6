//! Gleaner Core
//!
//! Composition and fault-isolating dispatch for declarative record
//! extraction.
//!
//! # Overview
//!
//! An extraction pipeline is built by composing small transformation
//! functions. Running it against one input document produces a lazy
//! stream of labeled [`Record`]s, so a single run can emit many records,
//! partial records, or per-record errors without aborting the whole run.
//!
//! # Architecture
//!
//! ```text
//! input → label → Named → leaf extractors (Composed pipelines) → labeled records
//! ```
//!
//! - [`composable`] / [`Composed`]: the pipe algebra; chain unary steps
//!   with `|` into reusable pipelines.
//! - [`value`] / [`values`]: adapt plain functions into extractors.
//! - [`Named`]: run one extractor per field, tagging records with the
//!   field name and isolating failures per field.
//! - [`Chained`]: run several extractors over the same rewindable input.
//! - [`label`]: prefix every record with a per-input label, or suppress
//!   the input.
//!
//! Failures raised while producing records are converted into
//! error-valued records instead of propagating: one bad field extractor
//! yields one error record, not a failed document.
//!
//! # Example Usage
//!
//! ```
//! use gleaner_core::{label, value, Extractor, Named};
//!
//! fn greeting(name: &str) -> Result<String, gleaner_core::ExtractError> {
//!     Ok(format!("hello, {}", name))
//! }
//!
//! let fields = Named::new().with("greeting", value(greeting));
//! let extract = label(|name: &str| Some(name.to_string()), fields);
//!
//! let records: Vec<_> = extract.extract("world").unwrap().collect();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].labels(), ["world", "greeting"]);
//! assert_eq!(records[0].result().as_ref().unwrap(), "hello, world");
//! ```

#![warn(missing_docs)]

pub mod compose;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod record;
pub mod source;

pub use compose::{composable, Composed};
pub use error::ExtractError;
pub use extractor::{
    label, value, values, Chained, Extractor, Labelled, Named, Records, ValueFn, ValuesFn,
};
pub use guard::Guard;
pub use record::Record;
pub use source::Rewind;
