//! Target URL construction.
//!
//! Paths are `<base>/<resource>[/<id>][/~<method>]`. The base endpoint is
//! normalised once: trailing slashes and any query string are dropped.

use crate::types::Authorization;

/// Base endpoint plus the credentials used for every call against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
    authorization: Authorization,
}

impl Endpoint {
    pub fn new(base: &str, authorization: Authorization) -> Self {
        Self {
            base: strip_query(base).trim_end_matches('/').to_string(),
            authorization,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn authorization(&self) -> &Authorization {
        &self.authorization
    }

    /// URL of a resource: the collection of a list resource, or the single
    /// element of a simple resource.
    pub fn collection(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    /// URL of one item of a list resource.
    pub fn item(&self, name: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base, name, id)
    }
}

/// URL of a named view or operation on `target`.
pub fn named(target: &str, method: &str) -> String {
    format!("{}/~{}", strip_query(target), method)
}

/// Drop everything from the first `?` on.
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Append `query` to `url` (without its own query) when non-empty.
pub fn with_query(url: &str, query: &str) -> String {
    let url = strip_query(url);
    if query.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{query}")
    }
}
