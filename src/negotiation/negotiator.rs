//! Picking a representation from request parts.
//!
//! # Precedence
//! 1. Explicit query parameter (unknown values resolve to Html)
//! 2. Format extension on the last path segment
//! 3. `Accept` header, by quality value
//! 4. Html

use axum::http::{header, request::Parts, HeaderMap, Uri};

use url::form_urlencoded;

use crate::config::NegotiationConfig;
use crate::negotiation::kind::RepresentationKind;

/// Stateless negotiator built once from configuration.
#[derive(Debug, Clone)]
pub struct Negotiator {
    config: NegotiationConfig,
}

impl Negotiator {
    pub fn new(config: NegotiationConfig) -> Self {
        Self { config }
    }

    /// Decide the representation for a request.
    pub fn negotiate(&self, parts: &Parts) -> RepresentationKind {
        self.negotiate_uri(&parts.uri, &parts.headers)
    }

    pub fn negotiate_uri(&self, uri: &Uri, headers: &HeaderMap) -> RepresentationKind {
        if let Some(value) = query_value(uri, &self.config.query_parameter) {
            let kind = RepresentationKind::from_override(&value).unwrap_or_default();
            tracing::trace!(value = %value, kind = %kind, "Representation from query parameter");
            return kind;
        }

        if self.config.path_extension {
            if let Some(kind) = path_extension(uri.path()).and_then(RepresentationKind::from_extension) {
                tracing::trace!(kind = %kind, "Representation from path extension");
                return kind;
            }
        }

        if self.config.accept_header {
            if let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
                if let Some(kind) = parse_accept(accept) {
                    tracing::trace!(accept = %accept, kind = %kind, "Representation from Accept header");
                    return kind;
                }
            }
        }

        RepresentationKind::Html
    }

    /// Name of the JavaScript function wrapping a callback response.
    pub fn callback_name(&self, uri: &Uri) -> String {
        match query_value(uri, &self.config.callback_parameter) {
            Some(name) if is_valid_callback(&name) => name,
            Some(name) => {
                tracing::debug!(callback = %name, "Rejected callback name, using default");
                self.config.default_callback.clone()
            }
            None => self.config.default_callback.clone(),
        }
    }
}

/// First value of a query parameter, percent-decoded.
fn query_value(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Extension of the last path segment, if it has one.
pub(crate) fn path_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then_some(ext)
}

/// Highest-quality recognized media range; ties keep header order.
fn parse_accept(accept: &str) -> Option<RepresentationKind> {
    let mut best: Option<(RepresentationKind, f32)> = None;

    for part in accept.split(',') {
        let mut segments = part.trim().split(';');
        let media_type = segments.next().unwrap_or("").trim();

        let quality = match segments.find_map(|p| p.trim().strip_prefix("q=")) {
            Some(q) => match q.trim().parse::<f32>() {
                Ok(q) if q.is_finite() && (0.0..=1.0).contains(&q) => q,
                _ => continue,
            },
            None => 1.0,
        };

        if quality <= 0.0 {
            continue;
        }

        if let Some(kind) = RepresentationKind::from_media_type(media_type) {
            match best {
                Some((_, q)) if q >= quality => {}
                _ => best = Some((kind, quality)),
            }
        }
    }

    best.map(|(kind, _)| kind)
}

/// Dotted JavaScript identifier: `cb`, `jQuery123`, `app.handlers.load`.
pub(crate) fn is_valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && name.split('.').all(|ident| {
            let mut chars = ident.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
                }
                _ => false,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn parts(uri: &str, accept: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn negotiator() -> Negotiator {
        Negotiator::new(NegotiationConfig::default())
    }

    #[test]
    fn test_default_is_html() {
        assert_eq!(negotiator().negotiate(&parts("/items", None)), RepresentationKind::Html);
    }

    #[test]
    fn test_query_override() {
        let n = negotiator();
        assert_eq!(n.negotiate(&parts("/items?format=json", None)), RepresentationKind::Json);
        assert_eq!(n.negotiate(&parts("/items?a=1&format=CSV", None)), RepresentationKind::Csv);
        assert_eq!(
            n.negotiate(&parts("/items?format=js", None)),
            RepresentationKind::JavaScriptCallback
        );
    }

    #[test]
    fn test_unknown_override_is_html_even_with_accept() {
        let n = negotiator();
        let p = parts("/items?format=yaml", Some("application/json"));
        assert_eq!(n.negotiate(&p), RepresentationKind::Html);
        // Same answer every time.
        assert_eq!(n.negotiate(&p), RepresentationKind::Html);
    }

    #[test]
    fn test_query_beats_extension_and_accept() {
        let p = parts("/items.csv?format=xml", Some("application/json"));
        assert_eq!(negotiator().negotiate(&p), RepresentationKind::Xml);
    }

    #[test]
    fn test_path_extension() {
        let n = negotiator();
        assert_eq!(n.negotiate(&parts("/items.json", None)), RepresentationKind::Json);
        assert_eq!(n.negotiate(&parts("/a.b/items.xml", None)), RepresentationKind::Xml);
        // Unknown extension is not an override; Accept still applies.
        assert_eq!(
            n.negotiate(&parts("/files/report.pdf", Some("text/csv"))),
            RepresentationKind::Csv
        );
    }

    #[test]
    fn test_path_extension_disabled() {
        let n = Negotiator::new(NegotiationConfig {
            path_extension: false,
            ..Default::default()
        });
        assert_eq!(n.negotiate(&parts("/items.json", None)), RepresentationKind::Html);
    }

    #[test]
    fn test_accept_quality_values() {
        let n = negotiator();
        assert_eq!(
            n.negotiate(&parts("/", Some("application/xml;q=0.5, application/json"))),
            RepresentationKind::Json
        );
        assert_eq!(
            n.negotiate(&parts("/", Some("text/csv, application/json"))),
            RepresentationKind::Csv
        );
        assert_eq!(
            n.negotiate(&parts("/", Some("application/json;q=0, text/xml;q=0.2"))),
            RepresentationKind::Xml
        );
        assert_eq!(n.negotiate(&parts("/", Some("*/*"))), RepresentationKind::Html);
        assert_eq!(n.negotiate(&parts("/", Some("image/png"))), RepresentationKind::Html);
    }

    #[test]
    fn test_accept_disabled() {
        let n = Negotiator::new(NegotiationConfig {
            accept_header: false,
            ..Default::default()
        });
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let uri: Uri = "/items".parse().unwrap();
        assert_eq!(n.negotiate_uri(&uri, &headers), RepresentationKind::Html);
    }

    #[test]
    fn test_custom_query_parameter() {
        let n = Negotiator::new(NegotiationConfig {
            query_parameter: "responseType".into(),
            ..Default::default()
        });
        assert_eq!(
            n.negotiate(&parts("/items?responseType=Json", None)),
            RepresentationKind::Json
        );
        assert_eq!(n.negotiate(&parts("/items?format=json", None)), RepresentationKind::Html);
    }

    #[test]
    fn test_callback_name() {
        let n = negotiator();
        let uri: Uri = "/items?format=js&callback=app.onLoad".parse().unwrap();
        assert_eq!(n.callback_name(&uri), "app.onLoad");

        let uri: Uri = "/items?callback=alert(1)".parse().unwrap();
        assert_eq!(n.callback_name(&uri), "callback");

        let uri: Uri = "/items".parse().unwrap();
        assert_eq!(n.callback_name(&uri), "callback");
    }

    #[test]
    fn test_percent_decoding() {
        let uri: Uri = "/items?callback=my%5Fcb".parse().unwrap();
        assert_eq!(negotiator().callback_name(&uri), "my_cb");

        let uri: Uri = "/items?form%61t=x%6Dl&callback=%zz".parse().unwrap();
        assert_eq!(negotiator().negotiate_uri(&uri, &HeaderMap::new()), RepresentationKind::Xml);
        assert_eq!(negotiator().callback_name(&uri), "callback");
    }

    #[test]
    fn test_out_of_range_quality_is_ignored() {
        assert_eq!(
            parse_accept("text/csv;q=0.5, application/json;q=NaN"),
            Some(RepresentationKind::Csv)
        );
        assert_eq!(parse_accept("text/csv, application/json;q=7"), Some(RepresentationKind::Csv));
        assert_eq!(parse_accept("application/json;q=-1"), None);
        assert_eq!(parse_accept("application/xml;q=inf"), None);
        assert_eq!(
            parse_accept("text/csv;q=0.9, application/json;q=1.000"),
            Some(RepresentationKind::Json)
        );
    }
}
