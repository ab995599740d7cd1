//! Formatters that make up the default formatter set.

use anyhow::Context;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use serde_json::{Map, Value};

use super::builder::FormatterBuilder;
use super::core::{FormatterConfiguration, ReadFromStreamArgs, WriteToStreamArgs};
use super::mapping::{NegotiationRule, StringComparison};

/// JSON formatter backed by `serde_json`.
///
/// Supports `application/json` and `text/json` in UTF-8 or UTF-16LE. An
/// `X-Requested-With: XMLHttpRequest` header selects JSON regardless of `Accept`.
#[must_use]
pub fn json_formatter() -> FormatterConfiguration {
    let mut builder = FormatterBuilder::new();
    builder
        .read_from_stream(|args: ReadFromStreamArgs| async move { read_json(&args) })
        .write_to_stream(|args: WriteToStreamArgs| async move { write_json(&args) })
        .push_media_type(mime::APPLICATION_JSON)
        .push_media_type(text_json())
        .push_encoding(UTF_8)
        .push_encoding(UTF_16LE)
        .push_rule(NegotiationRule::RequestHeader {
            header: "x-requested-with".to_string(),
            value: "XMLHttpRequest".to_string(),
            comparison: StringComparison::IgnoreCase,
            is_substring: true,
            media_type: mime::APPLICATION_JSON,
        });
    builder.build()
}

/// `application/x-www-form-urlencoded` reader.
///
/// Reads form bodies into a flat JSON object of strings; repeated keys keep
/// the last value. Never writes.
#[must_use]
pub fn form_url_encoded_formatter() -> FormatterConfiguration {
    let mut builder = FormatterBuilder::new();
    builder
        .can_write_type(|_| false)
        .read_from_stream(|args: ReadFromStreamArgs| async move { Ok::<_, anyhow::Error>(read_form(&args.body)) })
        .push_media_type(mime::APPLICATION_WWW_FORM_URLENCODED)
        .push_encoding(UTF_8);
    builder.build()
}

fn read_json(args: &ReadFromStreamArgs) -> anyhow::Result<Value> {
    let text = decode(&args.body, args.encoding);
    serde_json::from_str(&text).with_context(|| format!("invalid JSON body for '{}'", args.type_name))
}

fn write_json(args: &WriteToStreamArgs) -> anyhow::Result<Vec<u8>> {
    let text = serde_json::to_string(&args.value)
        .with_context(|| format!("cannot serialize '{}' as JSON", args.type_name))?;
    Ok(encode(&text, args.encoding))
}

fn read_form(body: &[u8]) -> Value {
    let fields: Map<String, Value> = url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Value::Object(fields)
}

// `mime` has no constant for the legacy `text/json` alias.
fn text_json() -> mime::Mime {
    "text/json".parse().unwrap_or(mime::APPLICATION_JSON)
}

fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// `encoding_rs` has no UTF-16 encoder, so UTF-16 output is produced by hand.
fn encode(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    if encoding == UTF_16LE {
        return text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    }
    if encoding == UTF_16BE {
        return text.encode_utf16().flat_map(u16::to_be_bytes).collect();
    }
    let (bytes, _, _) = encoding.encode(text);
    bytes.into_owned()
}
