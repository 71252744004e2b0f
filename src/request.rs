//! Read-only request accessors
//!
//! The resolver never owns an HTTP request. It only needs parameter values by
//! name and a header by name, so any server library can implement
//! [`RequestView`] over its own request type.

use percent_encoding::percent_decode_str;

/// Name of the explicit language override parameter.
pub const LANGUAGE_PARAMETER: &str = "lang";

/// Name of the standard language preference header.
pub const ACCEPT_LANGUAGE: &str = "Accept-Language";

pub trait RequestView {
    /// Every value supplied for a query or form parameter, in request order.
    fn parameter_values(&self, name: &str) -> Vec<&str>;

    /// First value of a header, matched case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    fn first_parameter(&self, name: &str) -> Option<&str> {
        self.parameter_values(name).into_iter().next()
    }
}

/// Owned request snapshot: decoded query parameters plus headers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StaticRequest {
    parameters: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

impl StaticRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a raw query string such as `lang=fr&lang=de&x=1`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let parameters = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((name, value)) => (decode_component(name), decode_component(value)),
                None => (decode_component(pair), String::new()),
            })
            .collect();

        Self {
            parameters,
            headers: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl RequestView for StaticRequest {
    fn parameter_values(&self, name: &str) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Decode `application/x-www-form-urlencoded` text. Malformed escapes are kept literally.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
