//! Query signature and cache keys
//!
//! A [`QuerySignature`] is the deterministic description of a result set (resource, filters,
//! ordering). Its canonical text is hashed into the cache keys of both snapshot kinds.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Filter + sort description of a result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QuerySignature {
    resource: String,
    filters: BTreeMap<String, String>,
    ordering: Vec<String>,
}

impl QuerySignature {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Default::default()
        }
    }

    /// Add an equality filter; a later value for the same field replaces the earlier one
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Append an ordering field (`-` prefix for descending)
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.ordering.push(field.into());
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn ordering(&self) -> &[String] {
        &self.ordering
    }

    /// Canonical text: `resource?k=v&k2=v2#order=f1,-f2`
    pub fn canonical(&self) -> String {
        let filters = self
            .filters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!(
            "{}?{}#order={}",
            self.resource,
            filters,
            self.ordering.join(",")
        )
    }

    /// Hex SHA-256 of the canonical text
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.canonical().as_bytes()))
    }
}

impl fmt::Display for QuerySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Cache keys of one signature within one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    pub identifiers: String,
    pub count: String,
}

impl CacheKeys {
    pub fn new(prefix: &str, signature: &QuerySignature) -> Self {
        let digest = signature.digest();
        Self {
            identifiers: format!("{}:pks:{}", prefix, digest),
            count: format!("{}:count:{}", prefix, digest),
        }
    }
}
