//! URL decomposition.
//!
//! # Design
//! Parsing is delegated to the `url` crate; this module narrows its result to
//! the pieces a GET needs and enforces the component length limits. A URL
//! that exceeds a limit is rejected with `UrlTooLong` rather than truncated.

use ::url::{Host, Url};

use crate::error::{HttpError, UrlComponent};

pub const MAX_SCHEME_LEN: usize = 15;
pub const MAX_HOST_LEN: usize = 255;
pub const MAX_PATH_LEN: usize = 1023;
pub const MAX_EXTRA_LEN: usize = 1023;

/// The parts of a URL used to open a connection and build a request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlComponents {
    pub scheme: String,
    pub host: String,
    /// Port written in the URL, 0 when the URL does not name one.
    pub port: u16,
    pub path: String,
    /// Query and fragment, including their `?` / `#` markers.
    pub extra: String,
}

impl UrlComponents {
    /// The URL's own query string without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        let query = self.extra.strip_prefix('?')?;
        Some(query.split_once('#').map_or(query, |(q, _)| q))
    }

    /// Build the request target sent on the request line: the path, then the
    /// URL's own query and `params` joined by `&`. The fragment is dropped.
    pub fn request_target(&self, params: &str) -> String {
        let mut target = self.path.clone();
        let existing = self.query().filter(|q| !q.is_empty());
        match (existing, params.is_empty()) {
            (Some(q), true) => {
                target.push('?');
                target.push_str(q);
            }
            (Some(q), false) => {
                target.push('?');
                target.push_str(q);
                target.push('&');
                target.push_str(params);
            }
            (None, false) => {
                target.push('?');
                target.push_str(params);
            }
            (None, true) => {}
        }
        target
    }
}

/// Split `input` into scheme, host, port, path and query/fragment.
pub fn parse(input: &str) -> Result<UrlComponents, HttpError> {
    let malformed = |reason: String| HttpError::MalformedUrl {
        url: input.to_string(),
        reason,
    };

    let url = Url::parse(input).map_err(|e| malformed(e.to_string()))?;

    let scheme = url.scheme();
    check_len(UrlComponent::Scheme, scheme, MAX_SCHEME_LEN)?;
    if scheme != "http" && scheme != "https" {
        return Err(malformed(format!("unsupported scheme `{scheme}`")));
    }

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return Err(malformed("missing host".to_string())),
    };
    check_len(UrlComponent::Host, &host, MAX_HOST_LEN)?;

    let path = url.path().to_string();
    check_len(UrlComponent::Path, &path, MAX_PATH_LEN)?;

    let mut extra = String::new();
    if let Some(query) = url.query() {
        extra.push('?');
        extra.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        extra.push('#');
        extra.push_str(fragment);
    }
    check_len(UrlComponent::Extra, &extra, MAX_EXTRA_LEN)?;

    Ok(UrlComponents {
        scheme: scheme.to_string(),
        host,
        port: url.port().unwrap_or(0),
        path,
        extra,
    })
}

fn check_len(component: UrlComponent, value: &str, max: usize) -> Result<(), HttpError> {
    let len = value.chars().count();
    if len > max {
        return Err(HttpError::UrlTooLong { component, len, max });
    }
    Ok(())
}
