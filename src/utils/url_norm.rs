//! Target URL validation and normalization.

use url::Url;

/// Errors that can occur while normalizing a target URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormError {
    #[error("invalid URL")]
    InvalidFormat,

    #[error("only HTTP and HTTPS URLs can be shortened")]
    UnsupportedScheme,

    #[error("URL must have a host")]
    MissingHost,
}

/// Parses `input` into an absolute HTTP(S) URL.
///
/// # Normalization Rules
///
/// 1. **Scheme enforcement**: input without a scheme gets `https://`
/// 2. **Protocol**: only HTTP and HTTPS are accepted (rejects `javascript:`,
///    `data:`, `file:`, and the rest)
/// 3. **Host**: required; the `url` crate lowercases it on parse
/// 4. Path, query, and fragment are preserved as-is
///
/// # Errors
///
/// Returns [`UrlNormError::InvalidFormat`] for input that does not parse
/// even with a scheme prepended, [`UrlNormError::UnsupportedScheme`] for
/// non-HTTP(S) schemes, and [`UrlNormError::MissingHost`] for host-less
/// URLs.
pub fn normalize_url(input: &str) -> Result<Url, UrlNormError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormError::InvalidFormat);
    }

    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", trimmed)).map_err(|_| UrlNormError::InvalidFormat)?
        }
        Err(_) => return Err(UrlNormError::InvalidFormat),
    };

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormError::UnsupportedScheme),
    }

    if url.host_str().is_none() {
        return Err(UrlNormError::MissingHost);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_https() {
        let url = normalize_url("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_simple_http() {
        let url = normalize_url("http://example.com/path").unwrap();
        assert_eq!(url.as_str(), "http://example.com/path");
    }

    #[test]
    fn test_schemeless_gets_https() {
        let url = normalize_url("example.com/path").unwrap();
        assert_eq!(url.as_str(), "https://example.com/path");
    }

    #[test]
    fn test_schemeless_with_query() {
        let url = normalize_url("example.com/search?q=rust").unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?q=rust");
    }

    #[test]
    fn test_host_is_lowercased() {
        let url = normalize_url("https://EXAMPLE.COM/Path").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Path");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let url = normalize_url("  https://example.com  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_query_params_preserved() {
        let url = normalize_url("https://example.com/search?a=1&b=2").unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?a=1&b=2");
    }

    #[test]
    fn test_custom_port_preserved() {
        let url = normalize_url("http://example.com:8080/api").unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/api");
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            normalize_url(""),
            Err(UrlNormError::InvalidFormat)
        ));
        assert!(matches!(
            normalize_url("   "),
            Err(UrlNormError::InvalidFormat)
        ));
    }

    #[test]
    fn test_ftp_rejected() {
        assert!(matches!(
            normalize_url("ftp://example.com/file.txt"),
            Err(UrlNormError::UnsupportedScheme)
        ));
    }

    #[test]
    fn test_javascript_rejected() {
        assert!(matches!(
            normalize_url("javascript:alert('xss')"),
            Err(UrlNormError::UnsupportedScheme)
        ));
    }

    #[test]
    fn test_data_rejected() {
        assert!(matches!(
            normalize_url("data:text/plain,hello"),
            Err(UrlNormError::UnsupportedScheme)
        ));
    }

    #[test]
    fn test_file_rejected() {
        assert!(matches!(
            normalize_url("file:///etc/passwd"),
            Err(UrlNormError::MissingHost) | Err(UrlNormError::UnsupportedScheme)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(normalize_url("http://").is_err());
    }

    #[test]
    fn test_ip_address_target() {
        let url = normalize_url("http://192.168.1.1:8080/api").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.1:8080/api");
    }
}
