//! `ResourceDescriptor` - identity of a remote read.

use std::collections::BTreeMap;
use std::fmt;

/// Identifies a remote fetch: an endpoint path plus query parameters.
///
/// Two descriptors with the same endpoint and parameters denote the same
/// logical resource. Parameters are kept sorted so equality does not depend
/// on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceDescriptor {
    /// Endpoint path relative to the service base URL (e.g. `movie/550/credits`).
    endpoint: String,
    /// Query parameters.
    params: BTreeMap<String, String>,
}

impl ResourceDescriptor {
    /// Creates a descriptor without parameters.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds or replaces a query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns the endpoint path.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the query parameters.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Returns the parameters as `(key, value)` pairs for `reqwest` queries.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Checks that the descriptor can be sent.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason if the endpoint is empty, contains an
    /// empty or relative path segment, or a parameter value is blank.
    pub fn validate(&self) -> Result<(), String> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(String::from("endpoint is empty"));
        }
        if endpoint.starts_with('/') || endpoint.contains("://") {
            return Err(format!("endpoint must be a relative path: {endpoint}"));
        }
        if endpoint
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(format!("endpoint has an empty path segment: {endpoint}"));
        }
        if let Some((key, _)) = self.params.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("missing value for parameter `{key}`"));
        }
        Ok(())
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint)?;
        let mut separator = '?';
        for (key, value) in &self.params {
            write!(f, "{separator}{key}={value}")?;
            separator = '&';
        }
        Ok(())
    }
}
