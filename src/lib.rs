#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![cfg_attr(not(feature = "std"), no_std)]

//! An IETF [RFC 3986] URI parser with an editable buffer.
//!
//! [RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986/
//!
//! The crate is made of three layers:
//!
//! - [`parse`]: a grammar engine in which every production is a pure [`Rule`](parse::Rule),
//!   with exact error locations and lazily scanned repetitions.
//! - [`Url`]: a single contiguous buffer along with the length of every [`Part`].
//!   Every edit is a splice of the buffer that only changes the length of the
//!   part it falls in.
//! - [`Params`] and [`Segments`]: the query and the path as sequences of decoded
//!   elements, with [`Cursor`]-based lookup, insertion, replacement and removal.
//!
//! Percent-encoding helpers live in [`pct_enc`].
//!
//! # Examples
//!
//! ```
//! use uri_splice::Url;
//!
//! let mut url = Url::parse("https://example.com/search?q=rust&page=2")?;
//!
//! let params = url.params_mut();
//! let page = params.find("page");
//! params.replace_value(page, "3");
//! params.push_back(("lang", "en & fr"));
//!
//! url.segments_mut().push_back("all results");
//!
//! assert_eq!(
//!     url.as_str(),
//!     "https://example.com/search/all%20results?q=rust&page=3&lang=en%20%26%20fr"
//! );
//! # Ok::<_, uri_splice::ParseError>(())
//! ```
//!
//! # Feature flags
//!
//! - `std` (default): Enables `std` support. This includes [`Error`] implementations
//!   through `thiserror`.
//! - `serde`: Enables `serde` support for [`Url`].
//!
//! [`Error`]: std::error::Error

extern crate alloc;

mod error;
mod fmt;
mod params;
pub mod parse;
pub mod pct_enc;
mod segments;
mod url;
mod view;

pub use error::{DecodeError, OutOfRange, ParseError, ParseErrorKind};
pub use params::{Iter as ParamsIter, Param, ParamRef, Params, ParamsMut};
pub use segments::{Iter as SegmentsIter, Segments, SegmentsMut};
pub use url::{Part, Url};
pub use view::Cursor;
