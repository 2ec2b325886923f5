//! Paginated list responses
//!
//! Both list shapes are returned bare (not wrapped in [`crate::error::ApiResponse`]) so existing
//! list clients keep working.

use serde::{Deserialize, Serialize};

/// Page-number list response
///
/// ```json
/// { "count": 25, "current_page": 2, "next": "...?page=3", "previous": "...?page=1", "results": [] }
/// ```
///
/// `count` is only present when the caller asked for it with `show_count=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    pub current_page: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Limit/offset list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowResponse<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_omitted_when_absent() {
        let resp = PageResponse::<u32> {
            count: None,
            current_page: 1,
            next: None,
            previous: None,
            results: vec![1, 2],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("count").is_none());
        assert_eq!(json["current_page"], 1);
        assert!(json["next"].is_null());
    }
}
