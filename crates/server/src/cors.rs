// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Explicit CORS origin allow-listing. `*` is never implicitly granted:
//! an empty allow-list rejects every cross-origin request, and a literal
//! `*` entry matches only the literal origin `*`, not "anything".

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Build a `CorsLayer` that only reflects an `Origin` header matching one
/// of `allow_list`'s patterns back to the client.
pub fn layer(allow_list: Vec<String>) -> CorsLayer {
    CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin.to_str().map(|o| origin_matches(&allow_list, o)).unwrap_or(false)
        }))
}

/// Match an `Origin` header against an allow-list of exact origins,
/// `prefix*` suffix wildcards, and `*.host` subdomain wildcards.
pub fn origin_matches(allow_list: &[String], origin: &str) -> bool {
    allow_list.iter().any(|pattern| matches_pattern(pattern, origin))
}

fn matches_pattern(pattern: &str, origin: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix("*.") {
        let host = origin.strip_prefix("https://").or_else(|| origin.strip_prefix("http://")).unwrap_or(origin);
        return host == suffix || host.ends_with(&format!(".{suffix}"));
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return origin.starts_with(prefix);
    }
    pattern == origin
}

#[cfg(test)]
#[path = "cors_tests.rs"]
mod tests;
