//! Next/previous link building
//!
//! Links keep every other query parameter exactly as the client sent it and only replace (or
//! drop) the pagination parameters.

use axum::http::Uri;

/// `uri` with `key` set to `value`
pub fn replace_query_param(uri: &Uri, key: &str, value: impl ToString) -> String {
    rebuild(uri, &[key], Some((key, value.to_string())))
}

/// `uri` with `key` set to `value` and `other` set to `other_value`
pub fn replace_query_params(
    uri: &Uri,
    (key, value): (&str, impl ToString),
    (other, other_value): (&str, impl ToString),
) -> String {
    let base = rebuild(uri, &[key, other], Some((key, value.to_string())));
    format!("{}&{}={}", base, other, other_value.to_string())
}

/// `uri` with `key` removed and `other` set to `other_value`
pub fn remove_query_param(uri: &Uri, key: &str, set: Option<(&str, String)>) -> String {
    match set {
        Some((other, value)) => rebuild(uri, &[key, other], Some((other, value))),
        None => rebuild(uri, &[key], None),
    }
}

fn rebuild(uri: &Uri, drop: &[&str], append: Option<(&str, String)>) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let name = pair.split('=').next().unwrap_or("");
            !drop.contains(&name)
        })
        .map(str::to_string)
        .collect();
    if let Some((key, value)) = append {
        pairs.push(format!("{}={}", key, value));
    }

    if pairs.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_replace_keeps_other_params() {
        let u = uri("/api/orders?status=pending&page=2&ordering=-id");
        assert_eq!(
            replace_query_param(&u, "page", 3),
            "/api/orders?status=pending&ordering=-id&page=3"
        );
    }

    #[test]
    fn test_replace_without_query() {
        assert_eq!(
            replace_query_param(&uri("/api/orders"), "page", 2),
            "/api/orders?page=2"
        );
    }

    #[test]
    fn test_remove_param() {
        let u = uri("/api/orders?page=2&show_count=true");
        assert_eq!(
            remove_query_param(&u, "page", None),
            "/api/orders?show_count=true"
        );
        assert_eq!(
            remove_query_param(&uri("/api/orders?page=2"), "page", None),
            "/api/orders"
        );
    }

    #[test]
    fn test_limit_offset_links() {
        let u = uri("/api/orders/offset?limit=10&offset=10&status=pending");
        assert_eq!(
            replace_query_params(&u, ("limit", 10), ("offset", 20)),
            "/api/orders/offset?status=pending&limit=10&offset=20"
        );
        assert_eq!(
            remove_query_param(&u, "offset", Some(("limit", "10".to_string()))),
            "/api/orders/offset?status=pending&limit=10"
        );
    }
}
