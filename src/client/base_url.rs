//! API base URL normalization

use reqwest::Url;

use super::error::ApiError;

/// Default deployment of the analysis API
pub const DEFAULT_API_URL: &str = "https://web-production-f9f8.up.railway.app";

const API_PREFIX: &str = "/api/v1";

/// `https://<host>/api/v1`, always HTTPS, never a trailing slash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    root: String,
}

impl BaseUrl {
    /// Normalize a configured URL.
    ///
    /// `http://` is upgraded to `https://`, a bare host gets `https://`,
    /// trailing slashes are dropped and `/api/v1` is appended unless present.
    pub fn new(configured: &str) -> Result<Self, ApiError> {
        let trimmed = configured.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidBaseUrl("empty URL".to_string()));
        }

        let rest = match trimmed.split_once("://") {
            Some((scheme, rest))
                if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
            {
                rest
            }
            Some((scheme, _)) => {
                return Err(ApiError::InvalidBaseUrl(format!(
                    "unsupported scheme '{}' in {}",
                    scheme, trimmed
                )))
            }
            None => trimmed,
        };

        let rest = rest.trim_end_matches('/');
        if rest.is_empty() || rest.starts_with('/') {
            return Err(ApiError::InvalidBaseUrl(format!("{}: missing host", trimmed)));
        }

        let mut root = format!("https://{}", rest);
        if !root.ends_with(API_PREFIX) {
            root.push_str(API_PREFIX);
        }

        Self::validated(root)
    }

    /// Plain-HTTP root for talking to an in-process test backend
    #[cfg(test)]
    pub(crate) fn insecure_for_tests(origin: &str) -> Self {
        Self {
            root: format!("{}{}", origin.trim_end_matches('/'), API_PREFIX),
        }
    }

    fn validated(root: String) -> Result<Self, ApiError> {
        let url = Url::parse(&root)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", root, e)))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ApiError::InvalidBaseUrl(format!("{}: missing host", root)));
        }
        Ok(Self { root })
    }

    /// Full URL for an endpoint path such as `/history/`
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.root, path)
        } else {
            format!("{}/{}", self.root, path)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.root
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self {
            root: format!("{}{}", DEFAULT_API_URL, API_PREFIX),
        }
    }
}

impl std::fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_is_upgraded() {
        let url = BaseUrl::new("http://api.example.com").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v1");

        let upper = BaseUrl::new("HTTP://api.example.com/").unwrap();
        assert_eq!(upper.as_str(), "https://api.example.com/api/v1");
    }

    #[test]
    fn test_always_https_prefix() {
        for raw in [
            "api.example.com",
            "https://api.example.com",
            "http://localhost:8000",
            "  https://api.example.com///  ",
            "http://api.example.com/api/v1",
        ] {
            let url = BaseUrl::new(raw).unwrap();
            assert!(url.as_str().starts_with("https://"), "{} -> {}", raw, url);
            assert!(url.as_str().ends_with("/api/v1"), "{} -> {}", raw, url);
            assert!(!url.as_str().contains("/api/v1/api/v1"));
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(BaseUrl::new(""), Err(ApiError::InvalidBaseUrl(_))));
        assert!(matches!(
            BaseUrl::new("ftp://files.example.com"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(BaseUrl::new("http://"), Err(ApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_endpoint_joining() {
        let url = BaseUrl::new("https://api.example.com").unwrap();
        assert_eq!(url.endpoint("/history/"), "https://api.example.com/api/v1/history/");
        assert_eq!(url.endpoint("presets/"), "https://api.example.com/api/v1/presets/");
    }

    #[test]
    fn test_default_points_at_deployment() {
        assert_eq!(
            BaseUrl::default().as_str(),
            "https://web-production-f9f8.up.railway.app/api/v1"
        );
    }
}
