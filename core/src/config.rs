//! Client configuration.

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";
pub const DEFAULT_API_VERSION: &str = "1.1";

const ENV_BASE_URL: &str = "TWEET_API_BASE_URL";
const ENV_API_VERSION: &str = "TWEET_API_VERSION";
const ENV_USER_AGENT: &str = "TWEET_USER_AGENT";

/// Where requests go and how they identify themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_version: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: concat!("tweet-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `TWEET_API_BASE_URL`, `TWEET_API_VERSION` and
    /// `TWEET_USER_AGENT` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(version) = lookup(ENV_API_VERSION) {
            config.api_version = version;
        }
        if let Some(agent) = lookup(ENV_USER_AGENT) {
            config.user_agent = agent;
        }
        config
    }

    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    /// Full URL for an endpoint path such as `blocks/ids`.
    pub fn endpoint_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if self.api_version.is_empty() {
            format!("{}/{path}.json", self.base_url)
        } else {
            format!("{}/{}/{path}.json", self.base_url, self.api_version)
        }
    }
}
