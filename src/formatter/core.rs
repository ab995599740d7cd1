use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use encoding_rs::Encoding;
use futures::future::BoxFuture;
use mime::Mime;
use serde_json::Value;

use super::mapping::{NegotiationRequest, NegotiationRule};
use super::media_type::{essence, range_matches};

/// Decides whether a formatter handles a model type, by type name.
pub type TypePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Converts a request body into a model value.
pub type ReadFromStreamFn =
    Arc<dyn Fn(ReadFromStreamArgs) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

/// Converts a model value into a response body.
pub type WriteToStreamFn =
    Arc<dyn Fn(WriteToStreamArgs) -> BoxFuture<'static, anyhow::Result<Vec<u8>>> + Send + Sync>;

/// Input to a [`ReadFromStreamFn`].
#[derive(Debug, Clone)]
pub struct ReadFromStreamArgs {
    /// Model type the body should become
    pub type_name: String,
    /// Raw request body
    pub body: Vec<u8>,
    /// `Content-Type` of the request, when present
    pub content_type: Option<Mime>,
    /// Encoding selected for the body
    pub encoding: &'static Encoding,
}

/// Input to a [`WriteToStreamFn`].
#[derive(Debug, Clone)]
pub struct WriteToStreamArgs {
    /// Model type being written
    pub type_name: String,
    /// Value to serialize
    pub value: Value,
    /// Negotiated response media type
    pub content_type: Option<Mime>,
    /// Encoding selected for the response
    pub encoding: &'static Encoding,
}

/// Immutable media-type formatter configuration.
///
/// Produced by [`FormatterBuilder::build`](super::FormatterBuilder::build).
/// Cloning is cheap and every clone shares the same predicates and stream
/// functions, which the HTTP layer may call from many requests at once.
#[derive(Clone)]
pub struct FormatterConfiguration {
    pub(crate) can_read: TypePredicate,
    pub(crate) can_write: TypePredicate,
    pub(crate) reader: Option<ReadFromStreamFn>,
    pub(crate) writer: Option<WriteToStreamFn>,
    pub(crate) media_types: Vec<Mime>,
    pub(crate) encodings: Vec<&'static Encoding>,
    pub(crate) rules: Vec<NegotiationRule>,
}

impl FormatterConfiguration {
    #[must_use]
    pub fn can_read_type(&self, type_name: &str) -> bool {
        (self.can_read)(type_name)
    }

    #[must_use]
    pub fn can_write_type(&self, type_name: &str) -> bool {
        (self.can_write)(type_name)
    }

    #[must_use]
    pub fn supported_media_types(&self) -> &[Mime] {
        &self.media_types
    }

    #[must_use]
    pub fn supported_encodings(&self) -> &[&'static Encoding] {
        &self.encodings
    }

    #[must_use]
    pub fn rules(&self) -> &[NegotiationRule] {
        &self.rules
    }

    #[must_use]
    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }

    #[must_use]
    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }

    /// `true` when `media_type` is one of the supported media types
    /// (parameters are ignored).
    #[must_use]
    pub fn supports_media_type(&self, media_type: &Mime) -> bool {
        let wanted = essence(media_type);
        self.media_types.iter().any(|m| essence(m) == wanted)
    }

    /// First supported media type covered by the `Accept` range.
    #[must_use]
    pub fn media_type_for_range(&self, range: &Mime) -> Option<&Mime> {
        self.media_types.iter().find(|m| range_matches(range, m))
    }

    /// Media type of the first negotiation rule the request satisfies.
    #[must_use]
    pub fn match_rules(&self, request: &NegotiationRequest<'_>) -> Option<&Mime> {
        self.rules
            .iter()
            .find(|rule| rule.matches(request))
            .map(NegotiationRule::media_type)
    }

    /// First supported encoding, falling back to UTF-8.
    #[must_use]
    pub fn default_encoding(&self) -> &'static Encoding {
        self.encodings.first().copied().unwrap_or(encoding_rs::UTF_8)
    }

    /// Encoding named by the `charset` parameter when supported, otherwise
    /// [`default_encoding`](Self::default_encoding).
    #[must_use]
    pub fn select_encoding(&self, content_type: Option<&Mime>) -> &'static Encoding {
        content_type
            .and_then(|m| m.get_param(mime::CHARSET))
            .and_then(|charset| Encoding::for_label(charset.as_str().as_bytes()))
            .filter(|wanted| self.encodings.contains(wanted))
            .unwrap_or_else(|| self.default_encoding())
    }

    /// Run the configured reader.
    ///
    /// # Errors
    ///
    /// Fails when no reader is configured or the reader itself fails.
    pub async fn read_from_stream(&self, args: ReadFromStreamArgs) -> anyhow::Result<Value> {
        let reader = self
            .reader
            .as_ref()
            .ok_or_else(|| anyhow!("formatter cannot read '{}': no reader configured", args.type_name))?;
        reader(args).await
    }

    /// Run the configured writer.
    ///
    /// # Errors
    ///
    /// Fails when no writer is configured or the writer itself fails.
    pub async fn write_to_stream(&self, args: WriteToStreamArgs) -> anyhow::Result<Vec<u8>> {
        let writer = self
            .writer
            .as_ref()
            .ok_or_else(|| anyhow!("formatter cannot write '{}': no writer configured", args.type_name))?;
        writer(args).await
    }
}

impl fmt::Debug for FormatterConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterConfiguration")
            .field("media_types", &self.media_types.iter().map(ToString::to_string).collect::<Vec<_>>())
            .field("encodings", &self.encodings.iter().map(|e| e.name()).collect::<Vec<_>>())
            .field("rules", &self.rules)
            .field("reader", &self.reader.as_ref().map(|_| "<function>"))
            .field("writer", &self.writer.as_ref().map(|_| "<function>"))
            .finish_non_exhaustive()
    }
}
