use encoding_rs::Encoding;
use mime::Mime;

use super::error::{require, FormatterError};

/// Anything that names a media type.
///
/// Typed values and name strings both normalize to [`Mime`], so formatter
/// consumers only ever see one representation.
pub trait IntoMediaType {
    fn into_media_type(self) -> Result<Mime, FormatterError>;
}

impl IntoMediaType for Mime {
    fn into_media_type(self) -> Result<Mime, FormatterError> {
        Ok(self)
    }
}

impl IntoMediaType for &Mime {
    fn into_media_type(self) -> Result<Mime, FormatterError> {
        Ok(self.clone())
    }
}

impl IntoMediaType for &str {
    fn into_media_type(self) -> Result<Mime, FormatterError> {
        require("media_type", self)?;
        self.trim()
            .parse::<Mime>()
            .map_err(|e| FormatterError::invalid("media_type", format!("'{self}' is not a media type: {e}")))
    }
}

impl IntoMediaType for String {
    fn into_media_type(self) -> Result<Mime, FormatterError> {
        self.as_str().into_media_type()
    }
}

impl IntoMediaType for &String {
    fn into_media_type(self) -> Result<Mime, FormatterError> {
        self.as_str().into_media_type()
    }
}

/// Anything that names a text encoding.
///
/// Labels follow the WHATWG encoding standard (`utf-8`, `utf-16le`,
/// `iso-8859-1`, ...).
pub trait IntoEncoding {
    fn into_encoding(self) -> Result<&'static Encoding, FormatterError>;
}

impl IntoEncoding for &'static Encoding {
    fn into_encoding(self) -> Result<&'static Encoding, FormatterError> {
        Ok(self)
    }
}

impl IntoEncoding for &str {
    fn into_encoding(self) -> Result<&'static Encoding, FormatterError> {
        require("encoding", self)?;
        Encoding::for_label(self.trim().as_bytes())
            .ok_or_else(|| FormatterError::invalid("encoding", format!("unknown encoding label '{self}'")))
    }
}

impl IntoEncoding for String {
    fn into_encoding(self) -> Result<&'static Encoding, FormatterError> {
        self.as_str().into_encoding()
    }
}

/// `type/subtype` without parameters, lowercased.
#[must_use]
pub fn essence(media_type: &Mime) -> String {
    media_type.essence_str().to_ascii_lowercase()
}

/// Parse an `Accept` header into media ranges, highest quality first.
///
/// Ranges that fail to parse are skipped; `q` defaults to 1.0.
#[must_use]
pub fn parse_accept(header: &str) -> Vec<(Mime, f32)> {
    let mut ranges: Vec<(Mime, f32)> = header
        .split(',')
        .filter_map(|part| part.trim().parse::<Mime>().ok())
        .map(|m| {
            let quality = m
                .get_param("q")
                .and_then(|q| q.as_str().parse::<f32>().ok())
                .unwrap_or(1.0);
            (m, quality)
        })
        .filter(|(_, q)| *q > 0.0)
        .collect();
    ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranges
}

/// Parse an `Accept-Charset` header into encodings, highest quality first.
///
/// Unknown labels and `*` are skipped. Entries with `q=0` are kept so that
/// callers can tell a refused charset from one that was never mentioned.
/// Equal qualities keep header order.
#[must_use]
pub fn parse_accept_charset(header: &str) -> Vec<(&'static Encoding, f32)> {
    let mut charsets: Vec<(&'static Encoding, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut params = part.split(';');
            let encoding = Encoding::for_label(params.next()?.trim().as_bytes())?;
            let quality = params
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((encoding, quality))
        })
        .collect();
    charsets.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    charsets
}

/// `true` when the media range (`*/*`, `text/*`, `text/plain`) covers `media_type`.
#[must_use]
pub fn range_matches(range: &Mime, media_type: &Mime) -> bool {
    let type_ok = range.type_() == mime::STAR || range.type_() == media_type.type_();
    let subtype_ok = range.subtype() == mime::STAR || range.subtype() == media_type.subtype();
    type_ok && subtype_ok
}
