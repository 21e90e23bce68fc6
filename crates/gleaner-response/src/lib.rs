//! Gleaner Response Layer
//!
//! Rewindable input for extraction pipelines: a reader for saved HTTP
//! exchanges.
//!
//! # Architecture
//!
//! This crate implements the `Rewind` contract from `gleaner-core`. The
//! core's dispatch layer only requires that an input can be reset to its
//! start; [`Response`] provides that over a saved exchange (status line,
//! header block, body) plus the metadata extractors commonly label
//! records with, most importantly the URL the content was fetched from,
//! carried in the [`URL_HEADER`] header.
//!
//! # Example Usage
//!
//! ```
//! use gleaner_core::{label, value, Extractor};
//! use gleaner_response::{url_label, Response};
//!
//! let saved = b"HTTP/1.1 200 OK\r\n\
//! X-Request-URL: http://example.net/\r\n\
//! \r\n\
//! hello\n";
//! let response = Response::from_read(&saved[..]).unwrap();
//!
//! let extract = label(
//!     url_label,
//!     value(|r: &Response| Ok::<_, gleaner_core::ExtractError>(r.body_str().into_owned())),
//! );
//! let records: Vec<_> = extract.extract(&response).unwrap().collect();
//! assert_eq!(records[0].labels(), ["http://example.net/"]);
//! ```

#![warn(missing_docs)]

mod headers;
mod response;

pub use headers::Headers;
pub use response::{url_label, Response, ResponseError, URL_HEADER};
