use std::collections::BTreeMap;

use encoding_rs::Encoding;
use http::header::{ACCEPT, ACCEPT_CHARSET};
use mime::Mime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ConfigurationError;
use crate::discovery::ControllerResolver;
use crate::formatter::{
    form_url_encoded_formatter, json_formatter, parse_accept, parse_accept_charset, FormatterConfiguration,
    NegotiationRequest,
};

/// A whole template segment of the form `{name}`.
static PARAMETER_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{([A-Za-z_][A-Za-z0-9_]*)\}$").expect("route parameter regex should be valid")
});

/// Everything the HTTP layer needs to serve the API.
///
/// A fresh configuration has no controller resolver, no routes and the
/// default formatter set (JSON, then form-urlencoded).
#[derive(Debug, Clone, Default)]
pub struct HttpConfiguration {
    /// Handler-type resolution strategy; `None` until the API is configured
    pub controller_resolver: Option<ControllerResolver>,
    pub routes: RouteTable,
    pub formatters: FormatterCollection,
}

impl HttpConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once a controller resolver has been installed.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.controller_resolver.is_some()
    }
}

/// Default value of a route parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDefault {
    /// The parameter may be left out of the path
    Optional,
    /// The parameter takes this value when left out of the path
    Value(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal,
    Parameter(String),
}

/// A named route template such as `api/{controller}/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    name: String,
    template: String,
    segments: Vec<Segment>,
    defaults: BTreeMap<String, RouteDefault>,
}

impl Route {
    /// Parse `template` into a route.
    ///
    /// # Errors
    ///
    /// `InvalidRoute` for empty or malformed segments, repeated parameters,
    /// or defaults for parameters the template does not have.
    pub fn new<I, S>(name: impl Into<String>, template: &str, defaults: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (S, RouteDefault)>,
        S: Into<String>,
    {
        let invalid = |reason: String| ConfigurationError::InvalidRoute {
            template: template.to_string(),
            reason,
        };

        let trimmed = template.trim_matches('/');
        let mut segments = Vec::new();
        if !trimmed.is_empty() {
            for raw in trimmed.split('/') {
                let segment = if let Some(caps) = PARAMETER_SEGMENT.captures(raw) {
                    let parameter = caps[1].to_string();
                    if segments.contains(&Segment::Parameter(parameter.clone())) {
                        return Err(invalid(format!("parameter '{parameter}' appears more than once")));
                    }
                    Segment::Parameter(parameter)
                } else if raw.is_empty() {
                    return Err(invalid("empty path segment".to_string()));
                } else if raw.contains(['{', '}']) {
                    return Err(invalid(format!("malformed parameter segment '{raw}'")));
                } else {
                    Segment::Literal
                };
                segments.push(segment);
            }
        }

        let defaults: BTreeMap<String, RouteDefault> = defaults.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if let Some(unknown) = defaults
            .keys()
            .find(|k| !segments.contains(&Segment::Parameter((*k).clone())))
        {
            return Err(invalid(format!("default given for unknown parameter '{unknown}'")));
        }

        Ok(Self {
            name: name.into(),
            template: template.to_string(),
            segments,
            defaults,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in template order.
    #[must_use]
    pub fn parameters(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Parameter(p) => Some(p.as_str()),
                Segment::Literal => None,
            })
            .collect()
    }

    #[must_use]
    pub fn default_for(&self, parameter: &str) -> Option<&RouteDefault> {
        self.defaults.get(parameter)
    }
}

/// Ordered set of named routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }

    /// Add a route at the end of the table.
    ///
    /// # Errors
    ///
    /// `InvalidRoute` when the template is malformed or the name is taken.
    pub fn map_http_route<I, S>(
        &mut self,
        name: &str,
        template: &str,
        defaults: I,
    ) -> Result<&Route, ConfigurationError>
    where
        I: IntoIterator<Item = (S, RouteDefault)>,
        S: Into<String>,
    {
        if self.get(name).is_some() {
            return Err(ConfigurationError::InvalidRoute {
                template: template.to_string(),
                reason: format!("a route named '{name}' already exists"),
            });
        }
        let route = Route::new(name, template, defaults)?;
        let index = self.routes.len();
        self.routes.push(route);
        Ok(&self.routes[index])
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Outcome of response content negotiation.
#[derive(Debug, Clone)]
pub struct Negotiated<'a> {
    pub formatter: &'a FormatterConfiguration,
    pub media_type: Mime,
    pub encoding: &'static Encoding,
}

/// Ordered formatter set. Earlier formatters win ties.
#[derive(Debug, Clone)]
pub struct FormatterCollection {
    formatters: Vec<FormatterConfiguration>,
}

impl Default for FormatterCollection {
    /// JSON, then form-urlencoded.
    fn default() -> Self {
        Self {
            formatters: vec![json_formatter(), form_url_encoded_formatter()],
        }
    }
}

impl FormatterCollection {
    /// A collection with no formatters at all.
    #[must_use]
    pub fn empty() -> Self {
        Self { formatters: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.formatters.clear();
    }

    pub fn add(&mut self, formatter: FormatterConfiguration) {
        self.formatters.push(formatter);
    }

    /// The first formatter that speaks `application/json`.
    #[must_use]
    pub fn json_formatter(&self) -> Option<&FormatterConfiguration> {
        self.formatters
            .iter()
            .find(|f| f.supports_media_type(&mime::APPLICATION_JSON))
    }

    /// Formatter for a request body of `content_type` bound to `type_name`.
    #[must_use]
    pub fn find_reader(&self, type_name: &str, content_type: &Mime) -> Option<&FormatterConfiguration> {
        self.formatters
            .iter()
            .find(|f| f.has_reader() && f.can_read_type(type_name) && f.supports_media_type(content_type))
    }

    /// Pick the formatter, media type and encoding for a `type_name` response.
    ///
    /// Only formatters with a writer that accept the type take part. Mapping
    /// rules are tried first, formatter by formatter; then `Accept` ranges by
    /// quality; otherwise the first candidate with a media type is used.
    /// The encoding follows `Accept-Charset` when the formatter supports it.
    #[must_use]
    pub fn negotiate(&self, type_name: &str, request: &NegotiationRequest<'_>) -> Option<Negotiated<'_>> {
        let candidates: Vec<&FormatterConfiguration> = self
            .formatters
            .iter()
            .filter(|f| f.has_writer() && f.can_write_type(type_name))
            .collect();

        let by_rule = candidates
            .iter()
            .find_map(|f| f.match_rules(request).map(|m| (*f, m.clone())));

        let by_accept = || {
            let accept = header_values(request, ACCEPT).join(", ");
            parse_accept(&accept).into_iter().find_map(|(range, _)| {
                candidates
                    .iter()
                    .find_map(|f| f.media_type_for_range(&range).map(|m| (*f, m.clone())))
            })
        };

        let fallback = || {
            candidates
                .iter()
                .find_map(|f| f.supported_media_types().first().map(|m| (*f, m.clone())))
        };

        let (formatter, media_type) = by_rule.or_else(by_accept).or_else(fallback)?;
        Some(Negotiated {
            formatter,
            media_type,
            encoding: accepted_encoding(formatter, request),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatterConfiguration> {
        self.formatters.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

fn header_values<'a>(request: &NegotiationRequest<'a>, name: http::HeaderName) -> Vec<&'a str> {
    request
        .headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect()
}

/// Highest-quality supported charset from `Accept-Charset`; otherwise the
/// first supported encoding the client did not refuse with `q=0`.
fn accepted_encoding(formatter: &FormatterConfiguration, request: &NegotiationRequest<'_>) -> &'static Encoding {
    let charsets = parse_accept_charset(&header_values(request, ACCEPT_CHARSET).join(", "));
    let supported = formatter.supported_encodings();
    let refused = |e: &&'static Encoding| charsets.iter().any(|(c, q)| c == e && *q <= 0.0);

    charsets
        .iter()
        .filter(|(_, q)| *q > 0.0)
        .map(|(e, _)| *e)
        .find(|e| supported.contains(e))
        .or_else(|| supported.iter().copied().find(|e| !refused(e)))
        .unwrap_or_else(|| formatter.default_encoding())
}
