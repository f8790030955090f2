use url::Url;

/// Check whether `text` is a well-formed http/https URL.
pub fn is_valid_url(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    match Url::parse(text) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().map_or(false, |host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Reduce a URL to scheme + host[:port] + path, dropping query and fragment.
///
/// Callers are expected to run `is_valid_url` first; input that does not
/// parse comes back unchanged.
pub fn normalize_url(text: &str) -> String {
    let Ok(parsed) = Url::parse(text) else {
        return text.to_string();
    };

    let host = parsed.host_str().unwrap_or_default();
    match parsed.port() {
        Some(port) => format!("{}://{}:{}{}", parsed.scheme(), host, port, parsed.path()),
        None => format!("{}://{}{}", parsed.scheme(), host, parsed.path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_only() {
        assert!(is_valid_url("https://a.com"));
        assert!(is_valid_url("http://a.com/watch?v=1"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("ftp://a.com"));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn normalize_strips_query_and_fragment() {
        assert_eq!(
            normalize_url("https://a.com/path?x=1#frag"),
            "https://a.com/path"
        );
    }

    #[test]
    fn normalize_keeps_explicit_ports() {
        assert_eq!(
            normalize_url("http://a.com:8080/v?list=2"),
            "http://a.com:8080/v"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        for url in [
            "https://a.com",
            "https://a.com/path?x=1#frag",
            "http://a.com:8080/v",
        ] {
            let once = normalize_url(url);
            assert_eq!(normalize_url(&once), once);
        }
    }
}
