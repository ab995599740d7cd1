use std::fmt;
use std::future::Future;
use std::sync::Arc;

use encoding_rs::Encoding;
use futures::FutureExt;
use http::HeaderName;
use mime::Mime;
use serde_json::Value;

use super::core::{
    FormatterConfiguration, ReadFromStreamArgs, ReadFromStreamFn, TypePredicate, WriteToStreamArgs,
    WriteToStreamFn,
};
use super::error::{require, FormatterError};
use super::mapping::{NegotiationRule, StringComparison};
use super::media_type::{IntoEncoding, IntoMediaType};

/// Builder for a custom [`FormatterConfiguration`] with a fluent API
///
/// Every method validates its arguments before touching the builder, so a
/// rejected call leaves previously accumulated state as it was. Media types
/// can be given as [`Mime`] values or as strings; both end up as the same
/// [`Mime`] in the built configuration.
///
/// # Example
///
/// ```rust
/// use webapi_pack::formatter::{FormatterBuilder, StringComparison};
///
/// # fn main() -> Result<(), webapi_pack::formatter::FormatterError> {
/// let mut builder = FormatterBuilder::new();
/// builder
///     .can_write_type(|name| name != "Secret")
///     .write_to_stream(|args| async move { Ok::<_, anyhow::Error>(args.value.to_string().into_bytes()) })
///     .support_media_type("text/x-plain-json")?
///     .support_encoding("utf-8")?
///     .map_query_string("format", "plain", "text/x-plain-json")?
///     .map_request_header("x-format", "plain", StringComparison::IgnoreCase, false, "text/x-plain-json")?
///     .map_uri_extension("pjson", "text/x-plain-json")?;
///
/// let formatter = builder.build();
/// assert_eq!(formatter.rules().len(), 3);
/// assert!(!formatter.can_write_type("Secret"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FormatterBuilder {
    can_read: TypePredicate,
    can_write: TypePredicate,
    reader: Option<ReadFromStreamFn>,
    writer: Option<WriteToStreamFn>,
    media_types: Vec<Mime>,
    encodings: Vec<&'static Encoding>,
    rules: Vec<NegotiationRule>,
}

impl FormatterBuilder {
    /// Create a builder that accepts every type and supports nothing yet.
    pub fn new() -> Self {
        Self {
            can_read: Arc::new(|_: &str| true),
            can_write: Arc::new(|_: &str| true),
            reader: None,
            writer: None,
            media_types: Vec::new(),
            encodings: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Replace the can-read predicate (default: every type).
    pub fn can_read_type<F>(&mut self, condition: F) -> &mut Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.can_read = Arc::new(condition);
        self
    }

    /// Replace the can-write predicate (default: every type).
    pub fn can_write_type<F>(&mut self, condition: F) -> &mut Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.can_write = Arc::new(condition);
        self
    }

    /// Set the function that turns a request body into a value.
    pub fn read_from_stream<F, Fut>(&mut self, read: F) -> &mut Self
    where
        F: Fn(ReadFromStreamArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.reader = Some(Arc::new(move |args| read(args).boxed()));
        self
    }

    /// Set the function that turns a value into a response body.
    pub fn write_to_stream<F, Fut>(&mut self, write: F) -> &mut Self
    where
        F: Fn(WriteToStreamArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
    {
        self.writer = Some(Arc::new(move |args| write(args).boxed()));
        self
    }

    /// Append a supported media type.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when a media type string is empty or unparsable.
    pub fn support_media_type(&mut self, media_type: impl IntoMediaType) -> Result<&mut Self, FormatterError> {
        let media_type = media_type.into_media_type()?;
        Ok(self.push_media_type(media_type))
    }

    /// Append a supported text encoding.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when an encoding label is empty or unknown.
    pub fn support_encoding(&mut self, encoding: impl IntoEncoding) -> Result<&mut Self, FormatterError> {
        let encoding = encoding.into_encoding()?;
        Ok(self.push_encoding(encoding))
    }

    /// Map `?parameter=value` to `media_type`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when any argument is empty or the media type is unparsable.
    pub fn map_query_string(
        &mut self,
        parameter: &str,
        value: &str,
        media_type: impl IntoMediaType,
    ) -> Result<&mut Self, FormatterError> {
        require("parameter_name", parameter)?;
        require("parameter_value", value)?;
        let media_type = media_type.into_media_type()?;

        Ok(self.push_rule(NegotiationRule::QueryString {
            parameter: parameter.to_string(),
            value: value.to_string(),
            media_type,
        }))
    }

    /// Map a request header value to `media_type`.
    ///
    /// With `is_substring` the expected value only has to occur somewhere in
    /// the header value.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when any argument is empty, the header name is not a
    /// valid HTTP header name, or the media type is unparsable.
    pub fn map_request_header(
        &mut self,
        header: &str,
        value: &str,
        comparison: StringComparison,
        is_substring: bool,
        media_type: impl IntoMediaType,
    ) -> Result<&mut Self, FormatterError> {
        require("header_name", header)?;
        require("header_value", value)?;
        HeaderName::from_bytes(header.as_bytes())
            .map_err(|e| FormatterError::invalid("header_name", format!("'{header}': {e}")))?;
        let media_type = media_type.into_media_type()?;

        Ok(self.push_rule(NegotiationRule::RequestHeader {
            header: header.to_string(),
            value: value.to_string(),
            comparison,
            is_substring,
            media_type,
        }))
    }

    /// Map a path extension (`orders.json` → `json`) to `media_type`.
    ///
    /// The extension may be given with or without its leading `.`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the extension is empty or the media type is unparsable.
    pub fn map_uri_extension(
        &mut self,
        extension: &str,
        media_type: impl IntoMediaType,
    ) -> Result<&mut Self, FormatterError> {
        require("extension", extension)?;
        let media_type = media_type.into_media_type()?;

        Ok(self.push_rule(NegotiationRule::UriSuffix {
            suffix: extension.to_string(),
            media_type,
        }))
    }

    /// Snapshot the accumulated state into an immutable configuration.
    ///
    /// The builder stays usable; later calls do not affect configurations
    /// that were already built.
    #[must_use]
    pub fn build(&self) -> FormatterConfiguration {
        FormatterConfiguration {
            can_read: Arc::clone(&self.can_read),
            can_write: Arc::clone(&self.can_write),
            reader: self.reader.clone(),
            writer: self.writer.clone(),
            media_types: self.media_types.clone(),
            encodings: self.encodings.clone(),
            rules: self.rules.clone(),
        }
    }

    pub(crate) fn push_media_type(&mut self, media_type: Mime) -> &mut Self {
        self.media_types.push(media_type);
        self
    }

    pub(crate) fn push_encoding(&mut self, encoding: &'static Encoding) -> &mut Self {
        self.encodings.push(encoding);
        self
    }

    pub(crate) fn push_rule(&mut self, rule: NegotiationRule) -> &mut Self {
        self.rules.push(rule);
        self
    }
}

impl fmt::Debug for FormatterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterBuilder")
            .field("media_types", &self.media_types.iter().map(ToString::to_string).collect::<Vec<_>>())
            .field("encodings", &self.encodings.iter().map(|e| e.name()).collect::<Vec<_>>())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl Default for FormatterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
