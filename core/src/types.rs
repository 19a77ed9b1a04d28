//! Value types exchanged with the storage service.
//!
//! # Design
//! `Authorization`, `Cursor` and `Args` are built by callers and consumed by
//! the engine. `BadRequest`, `Conflict` and `Created` are wire records that
//! only ever appear in specific response bodies (400, 409 and successful
//! creation) and are parsed by the classifier.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Credentials attached to every request as `Authorization: <scheme> <value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    scheme: String,
    value: String,
}

impl Authorization {
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// Shorthand for the `Bearer` scheme.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new("Bearer", token)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme, self.value)
    }
}

/// Offset/limit paging token for list calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub offset: u64,
    pub limit: u64,
}

impl Cursor {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    pub fn query_string(&self) -> String {
        format!("offset={}&limit={}", self.offset, self.limit)
    }

    /// The cursor for the page right after this one.
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

/// Ordered query-string arguments for named views and operations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Args {
    pairs: Vec<(String, String)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Percent-encoded `key=value` pairs joined with `&`.
    pub fn query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Body of a 400 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadRequest {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Map<String, Value>>,
}

/// Body of a 409 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub code: String,
}

/// Body of a successful creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}
