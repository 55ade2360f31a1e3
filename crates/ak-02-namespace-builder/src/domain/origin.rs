//! # Origin Allowlist
//!
//! Decides whether a dApp origin may use the project. Patterns are either
//! full origins (`https://app.example.com`), schemeless `host[:port]`, or
//! wildcard hosts where `*` stands for exactly one label.

use url::Url;

struct RawOrigin<'a> {
    host: &'a str,
    port: Option<&'a str>,
}

/// Split `scheme://host[:port][/path]` without normalizing case.
fn parse_origin_raw(origin: &str) -> Option<RawOrigin<'_>> {
    let (_, rest) = origin.split_once("://")?;
    let host_port = rest.split('/').next().unwrap_or_default();
    Some(split_host_port(host_port))
}

fn split_host_port(host_port: &str) -> RawOrigin<'_> {
    match host_port.rsplit_once(':') {
        Some((host, port)) => RawOrigin {
            host,
            port: Some(port),
        },
        None => RawOrigin {
            host: host_port,
            port: None,
        },
    }
}

fn port_string(url: &Url) -> String {
    url.port().map(|p| p.to_string()).unwrap_or_default()
}

fn match_non_wildcard(current_origin: &str, pattern: &str) -> bool {
    if let Ok(url) = Url::parse(pattern) {
        if url.has_host() {
            return url.origin().ascii_serialization() == current_origin;
        }
    }

    let host_port = pattern.split('/').next().unwrap_or_default();
    let expected = split_host_port(host_port);
    match parse_origin_raw(current_origin) {
        Some(raw) if raw.host == expected.host => match expected.port {
            Some(port) => raw.port == Some(port),
            None => true,
        },
        _ => false,
    }
}

fn match_wildcard(current: &Url, current_origin: &str, pattern: &str) -> bool {
    let (scheme, rest) = match pattern.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, pattern),
    };
    let host_port = rest.split('/').next().unwrap_or_default();
    let expected = split_host_port(host_port);

    let pattern_labels: Vec<&str> = expected.host.split('.').collect();
    if pattern_labels
        .iter()
        .any(|label| label.contains('*') && *label != "*")
    {
        return false;
    }

    if scheme.is_some_and(|s| s != current.scheme()) {
        return false;
    }

    if let Some(port) = expected.port {
        if port != "*" && port != port_string(current) {
            return false;
        }
    }

    let host = match parse_origin_raw(current_origin) {
        Some(raw) => raw.host.to_string(),
        None => current.host_str().unwrap_or_default().to_string(),
    };
    let current_labels: Vec<&str> = host.split('.').collect();
    if pattern_labels.len() != current_labels.len() {
        return false;
    }

    pattern_labels
        .iter()
        .zip(current_labels.iter())
        .all(|(p, c)| *p == "*" || p == c)
}

/// Whether `current_origin` matches the allowlist.
///
/// An empty `allowed` list allows every origin; `localhost` and
/// `127.0.0.1` are always allowed. `defaults` are extra patterns that only
/// apply once `allowed` is non-empty.
pub fn is_origin_allowed(current_origin: &str, allowed: &[String], defaults: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let patterns = allowed.iter().chain(defaults.iter());

    let current = Url::parse(current_origin)
        .ok()
        .filter(|u| u.has_host());
    let Some(current) = current else {
        if current_origin.starts_with("localhost") || current_origin.starts_with("127.0.0.1") {
            return true;
        }
        return patterns
            .into_iter()
            .any(|p| !p.contains('*') && p == current_origin);
    };

    if matches!(current.host_str(), Some("localhost") | Some("127.0.0.1")) {
        return true;
    }

    for pattern in patterns {
        let matched = if pattern.contains('*') {
            match_wildcard(&current, current_origin, pattern)
        } else {
            match_non_wildcard(current_origin, pattern)
        };
        if matched {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_empty_allowlist_allows_all() {
        assert!(is_origin_allowed("https://evil.example", &[], &list(&["https://x.example"])));
    }

    #[test]
    fn test_localhost_always_allowed() {
        let allowed = list(&["https://app.example.com"]);
        assert!(is_origin_allowed("http://localhost:3000", &allowed, &[]));
        assert!(is_origin_allowed("http://127.0.0.1:8080", &allowed, &[]));
        assert!(is_origin_allowed("localhost:3000", &allowed, &[]));
    }

    #[test]
    fn test_exact_origin() {
        let allowed = list(&["https://app.example.com"]);
        assert!(is_origin_allowed("https://app.example.com", &allowed, &[]));
        assert!(!is_origin_allowed("http://app.example.com", &allowed, &[]));
        assert!(!is_origin_allowed("https://other.example.com", &allowed, &[]));
    }

    #[test]
    fn test_schemeless_host_and_port() {
        let allowed = list(&["app.example.com", "dev.example.com:8443"]);
        assert!(is_origin_allowed("https://app.example.com", &allowed, &[]));
        assert!(is_origin_allowed("https://dev.example.com:8443", &allowed, &[]));
        assert!(!is_origin_allowed("https://dev.example.com:9000", &allowed, &[]));
    }

    #[test]
    fn test_wildcard_matches_one_label() {
        let allowed = list(&["https://*.example.com"]);
        assert!(is_origin_allowed("https://app.example.com", &allowed, &[]));
        assert!(!is_origin_allowed("https://a.b.example.com", &allowed, &[]));
        assert!(!is_origin_allowed("https://example.com", &allowed, &[]));
        assert!(!is_origin_allowed("http://app.example.com", &allowed, &[]));
    }

    #[test]
    fn test_partial_label_wildcard_rejected() {
        let allowed = list(&["https://app*.example.com"]);
        assert!(!is_origin_allowed("https://app1.example.com", &allowed, &[]));
    }

    #[test]
    fn test_wildcard_port() {
        let allowed = list(&["*.example.com:*"]);
        assert!(is_origin_allowed("https://app.example.com:4000", &allowed, &[]));
    }

    #[test]
    fn test_defaults_apply_with_allowlist() {
        let allowed = list(&["https://app.example.com"]);
        let defaults = list(&["https://*.reown.com"]);
        assert!(is_origin_allowed("https://secure.reown.com", &allowed, &defaults));
    }
}
