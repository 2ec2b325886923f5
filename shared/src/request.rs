//! Request types for the shared crate
//!
//! Query parameters are kept as raw strings and interpreted leniently, the way list endpoints
//! have always treated them: a malformed `page_size` or `limit` falls back to the default instead
//! of rejecting the request.

use serde::Deserialize;

/// Page-number pagination parameters (`?page=&page_size=&show_count=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Page number, 1-based, or `last`
    #[serde(default)]
    pub page: Option<String>,

    /// Items per page
    #[serde(default)]
    pub page_size: Option<String>,

    /// `true` to include a (cached) total count
    #[serde(default)]
    pub show_count: Option<String>,
}

impl PageQuery {
    /// Raw page parameter, defaulting to the first page
    pub fn page_text(&self) -> &str {
        match self.page.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => "1",
        }
    }

    /// Only the literal `true` (any case) enables counting
    pub fn show_count(&self) -> bool {
        self.show_count
            .as_deref()
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Page size, clamped to `max`; invalid values fall back to `default`
    pub fn page_size(&self, default: usize, max: usize) -> usize {
        positive_clamped(self.page_size.as_deref(), default, max)
    }
}

/// Limit/offset pagination parameters (`?limit=&offset=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitOffsetQuery {
    #[serde(default)]
    pub limit: Option<String>,

    #[serde(default)]
    pub offset: Option<String>,
}

impl LimitOffsetQuery {
    /// Window size, clamped to `max`; invalid values fall back to `default`
    pub fn limit(&self, default: usize, max: usize) -> usize {
        positive_clamped(self.limit.as_deref(), default, max)
    }

    /// Window start; negative or malformed values read as 0
    pub fn offset(&self) -> usize {
        self.offset
            .as_deref()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0)
    }
}

/// Order list filters (`?status=&client_id=&is_paid=&ordering=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    /// Status wire name or numeric code
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub is_paid: Option<String>,

    /// Comma separated fields, `-` prefix for descending
    #[serde(default)]
    pub ordering: Option<String>,
}

impl OrderListQuery {
    /// Non-empty filters as `(field, value)` pairs
    pub fn filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("status", self.status.as_deref()),
            ("client_id", self.client_id.as_deref()),
            ("is_paid", self.is_paid.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (field, v))
        })
        .collect()
    }

    /// Ordering fields; empty when the caller did not ask for one
    pub fn ordering(&self) -> Vec<&str> {
        self.ordering
            .as_deref()
            .map(|o| {
                o.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn positive_clamped(raw: Option<&str>, default: usize, max: usize) -> usize {
    match raw.and_then(|v| v.trim().parse::<usize>().ok()) {
        Some(0) | None => default.min(max),
        Some(n) => n.min(max),
    }
}
