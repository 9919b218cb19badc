//! Caller headers passed through to the upstream image host.

/// Headers never sent upstream: connection-scoped ones, ones describing the
/// inbound request body, `accept-encoding` (the loader negotiates its own),
/// and conditional or partial requests, since only a full `200` is accepted.
const BLOCKED: &[&str] = &[
    "accept-encoding",
    "connection",
    "content-length",
    "content-type",
    "host",
    "if-match",
    "if-modified-since",
    "if-none-match",
    "if-range",
    "if-unmodified-since",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "range",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Ordered header pairs the loader forwards to the source host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedHeaders(Vec<(String, String)>);

impl ForwardedHeaders {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns true if a header with this name may be forwarded.
    #[must_use]
    pub fn is_forwardable(name: &str) -> bool {
        !BLOCKED.iter().any(|blocked| blocked.eq_ignore_ascii_case(name))
    }

    /// Adds a header unless it is blocked. Names are stored lowercase.
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        if Self::is_forwardable(name) {
            self.0.push((name.to_ascii_lowercase(), value.into()));
        }
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of forwarded headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing will be forwarded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ForwardedHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.push(name.as_ref(), value);
        }
        headers
    }
}
