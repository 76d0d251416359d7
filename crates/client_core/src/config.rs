use std::time::Duration;

use anyhow::{anyhow, Context};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Parsed base URL, normalized to end with `/` so resource paths are
    /// appended rather than replacing the last segment.
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let raw = self.api_base_url.trim();
        let mut url = Url::parse(raw)
            .with_context(|| format!("invalid api base url '{raw}'"))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!(
                "api base url must start with http:// or https://, got '{raw}'"
            ));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_demo_api_with_ten_second_timeout() {
        let config = ClientConfig::default();
        assert_eq!(
            config.base_url().expect("base url").as_str(),
            "https://jsonplaceholder.typicode.com/"
        );
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let config = ClientConfig::new("http://127.0.0.1:8080/api/v1");
        let url = config.base_url().expect("base url");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/v1/");
        assert_eq!(
            url.join("users").expect("join").as_str(),
            "http://127.0.0.1:8080/api/v1/users"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(ClientConfig::new("ftp://example.com").base_url().is_err());
        assert!(ClientConfig::new("not a url").base_url().is_err());
    }
}
