use http::{HeaderMap, Uri};
use mime::Mime;
use serde::{Deserialize, Serialize};

/// How a request header value is compared with the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringComparison {
    /// Exact byte-for-byte comparison
    #[default]
    CaseSensitive,
    /// ASCII case-insensitive comparison
    IgnoreCase,
}

impl StringComparison {
    #[must_use]
    pub fn equals(self, actual: &str, expected: &str) -> bool {
        match self {
            StringComparison::CaseSensitive => actual == expected,
            StringComparison::IgnoreCase => actual.eq_ignore_ascii_case(expected),
        }
    }

    #[must_use]
    pub fn contains(self, actual: &str, expected: &str) -> bool {
        match self {
            StringComparison::CaseSensitive => actual.contains(expected),
            StringComparison::IgnoreCase => actual
                .to_ascii_lowercase()
                .contains(&expected.to_ascii_lowercase()),
        }
    }
}

/// Declarative mapping from a request attribute to a response media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationRule {
    /// `?parameter=value` selects `media_type`
    QueryString {
        parameter: String,
        value: String,
        media_type: Mime,
    },
    /// A request header with the expected value selects `media_type`
    RequestHeader {
        header: String,
        value: String,
        comparison: StringComparison,
        is_substring: bool,
        media_type: Mime,
    },
    /// A path ending in `.suffix` selects `media_type`
    UriSuffix { suffix: String, media_type: Mime },
}

impl NegotiationRule {
    #[must_use]
    pub fn media_type(&self) -> &Mime {
        match self {
            NegotiationRule::QueryString { media_type, .. }
            | NegotiationRule::RequestHeader { media_type, .. }
            | NegotiationRule::UriSuffix { media_type, .. } => media_type,
        }
    }

    /// `true` when the request carries the attribute this rule maps.
    #[must_use]
    pub fn matches(&self, request: &NegotiationRequest<'_>) -> bool {
        match self {
            NegotiationRule::QueryString { parameter, value, .. } => request
                .query_pairs()
                .any(|(k, v)| k.eq_ignore_ascii_case(parameter) && v.eq_ignore_ascii_case(value)),
            NegotiationRule::RequestHeader {
                header,
                value,
                comparison,
                is_substring,
                ..
            } => request
                .headers
                .get_all(header.as_str())
                .iter()
                .filter_map(|v| v.to_str().ok())
                .any(|actual| {
                    if *is_substring {
                        comparison.contains(actual, value)
                    } else {
                        comparison.equals(actual, value)
                    }
                }),
            NegotiationRule::UriSuffix { suffix, .. } => request
                .path_extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(suffix.strip_prefix('.').unwrap_or(suffix))),
        }
    }
}

/// The parts of an HTTP request that negotiation rules look at.
#[derive(Debug, Clone, Copy)]
pub struct NegotiationRequest<'a> {
    pub uri: &'a Uri,
    pub headers: &'a HeaderMap,
}

impl<'a> NegotiationRequest<'a> {
    pub fn new(uri: &'a Uri, headers: &'a HeaderMap) -> Self {
        Self { uri, headers }
    }

    pub fn from_request<B>(request: &'a http::Request<B>) -> Self {
        Self::new(request.uri(), request.headers())
    }

    /// Decoded query string pairs, in order.
    pub fn query_pairs(&self) -> impl Iterator<Item = (String, String)> + 'a {
        url::form_urlencoded::parse(self.uri.query().unwrap_or("").as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
    }

    /// Extension of the last path segment, without the dot.
    #[must_use]
    pub fn path_extension(&self) -> Option<&'a str> {
        let segment = self.uri.path().rsplit('/').next()?;
        let (stem, ext) = segment.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty()).then_some(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn json() -> Mime {
        mime::APPLICATION_JSON
    }

    #[test]
    fn test_query_string_rule() {
        let rule = NegotiationRule::QueryString {
            parameter: "format".into(),
            value: "json".into(),
            media_type: json(),
        };
        let headers = HeaderMap::new();
        let hit: Uri = "/api/orders?Format=JSON&page=2".parse().unwrap();
        let miss: Uri = "/api/orders?format=xml".parse().unwrap();
        assert!(rule.matches(&NegotiationRequest::new(&hit, &headers)));
        assert!(!rule.matches(&NegotiationRequest::new(&miss, &headers)));
    }

    #[test]
    fn test_request_header_rule_exact_and_substring() {
        let uri: Uri = "/api/orders".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

        let exact = NegotiationRule::RequestHeader {
            header: "X-Requested-With".into(),
            value: "xmlhttprequest".into(),
            comparison: StringComparison::IgnoreCase,
            is_substring: false,
            media_type: json(),
        };
        let case_sensitive = NegotiationRule::RequestHeader {
            header: "x-requested-with".into(),
            value: "xmlhttprequest".into(),
            comparison: StringComparison::CaseSensitive,
            is_substring: false,
            media_type: json(),
        };
        let substring = NegotiationRule::RequestHeader {
            header: "x-requested-with".into(),
            value: "HttpReq".into(),
            comparison: StringComparison::CaseSensitive,
            is_substring: true,
            media_type: json(),
        };

        let request = NegotiationRequest::new(&uri, &headers);
        assert!(exact.matches(&request));
        assert!(!case_sensitive.matches(&request));
        assert!(substring.matches(&request));
    }

    #[test]
    fn test_uri_suffix_rule() {
        let rule = NegotiationRule::UriSuffix {
            suffix: "json".into(),
            media_type: json(),
        };
        let headers = HeaderMap::new();
        for (path, expected) in [
            ("/api/orders.json", true),
            ("/api/orders/5.JSON?x=1", true),
            ("/api/orders.xml", false),
            ("/api/orders", false),
            ("/api/.json", false),
        ] {
            let uri: Uri = path.parse().unwrap();
            assert_eq!(rule.matches(&NegotiationRequest::new(&uri, &headers)), expected, "{path}");
        }

        let dotted = NegotiationRule::UriSuffix {
            suffix: ".json".into(),
            media_type: json(),
        };
        let uri: Uri = "/api/orders.json".parse().unwrap();
        assert!(dotted.matches(&NegotiationRequest::new(&uri, &headers)));
    }
}
