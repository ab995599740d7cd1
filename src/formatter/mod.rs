//! # Formatter Module
//!
//! Media-type formatters for request and response bodies.
//!
//! A formatter is a [`FormatterConfiguration`]: two type predicates, an
//! optional reader and writer, the media types and text encodings it speaks,
//! and a list of [`NegotiationRule`]s that select one of its media types from
//! the request (query string, header, or path extension) before `Accept` is
//! consulted.
//!
//! Custom formatters are assembled with [`FormatterBuilder`]:
//!
//! ```rust
//! use webapi_pack::formatter::FormatterBuilder;
//!
//! # fn main() -> Result<(), webapi_pack::formatter::FormatterError> {
//! let mut builder = FormatterBuilder::new();
//! builder
//!     .support_media_type("application/foo")?
//!     .map_query_string("format", "foo", "application/foo")?;
//! let foo = builder.build();
//! assert_eq!(foo.supported_media_types()[0].essence_str(), "application/foo");
//! # Ok(())
//! # }
//! ```
//!
//! [`json_formatter`] and [`form_url_encoded_formatter`] make up the default
//! formatter set of a fresh [`HttpConfiguration`](crate::host::HttpConfiguration).

mod builder;
mod builtin;
mod core;
mod error;
mod mapping;
mod media_type;

pub use builder::FormatterBuilder;
pub use builtin::{form_url_encoded_formatter, json_formatter};
pub use core::{
    FormatterConfiguration, ReadFromStreamArgs, ReadFromStreamFn, TypePredicate, WriteToStreamArgs,
    WriteToStreamFn,
};
pub use error::FormatterError;
pub use mapping::{NegotiationRequest, NegotiationRule, StringComparison};
pub use media_type::{essence, parse_accept, parse_accept_charset, range_matches, IntoEncoding, IntoMediaType};
