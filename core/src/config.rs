//! Configuration for the shared API client.

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Base URL and headers sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Configuration for `base_url` with the default JSON headers.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("accept".to_string(), "application/json".to_string()),
            ],
        }
    }

    /// Add a header to every request, replacing any header with the same
    /// (case-insensitive) name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.default_headers
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert!(config
            .default_headers()
            .contains(&("content-type".to_string(), "application/json".to_string())));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(ClientConfig::new("http://clinic.test/api/").base_url(), "http://clinic.test/api");
    }

    #[test]
    fn with_header_replaces_same_name() {
        let config = ClientConfig::default().with_header("Content-Type", "text/plain");
        let content_types: Vec<_> = config
            .default_headers()
            .iter()
            .filter(|(k, _)| k == "content-type")
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(content_types[0].1, "text/plain");
    }

    #[test]
    fn with_header_appends_new_name() {
        let config = ClientConfig::default().with_header("Authorization", "Bearer t");
        assert_eq!(config.default_headers().len(), 3);
    }
}
