//! Client configuration.

/// Default server URL
const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// Where the client talks to and how it sends batches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL without a trailing slash
    pub api_url: String,
    /// Gzip batch payloads before sending
    pub compress_batches: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            compress_batches: true,
        }
    }

    /// Read `CHATBLOOM_API_URL` and `CHATBLOOM_COMPRESS_BATCHES`
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("CHATBLOOM_API_URL") {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => {
                tracing::debug!("[Client] CHATBLOOM_API_URL not set, using {}", DEFAULT_API_URL);
                Self::default()
            }
        };
        if let Some(flag) = lookup("CHATBLOOM_COMPRESS_BATCHES") {
            config.compress_batches = !matches!(flag.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        config
    }

    /// Disable gzip for batch sends
    pub fn without_compression(mut self) -> Self {
        self.compress_batches = false;
        self
    }

    /// Get the full URL for an API endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}
