#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Upper bound on pages fetched concurrently within one crawl batch.
pub const MAX_SCRAPER_CONCURRENCY: usize = 50;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_base_url: String,
    pub scraper_sitemap_path: String,
    pub scraper_user_agent: String,
    pub scraper_request_timeout_secs: u64,
    /// Delay between crawl batches, not between individual requests.
    pub scraper_rate_limit_ms: u64,
    /// Batch size, already clamped to `1..=MAX_SCRAPER_CONCURRENCY`.
    pub scraper_concurrency: usize,
    /// Total attempts for a page on transient network errors.
    pub scraper_max_attempts: u32,
    pub scraper_retry_backoff_ms: u64,
    pub scraper_headless: bool,
    pub scraper_render_timeout_ms: u64,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub anthropic_base_url: String,
}

impl AppConfig {
    /// Full sitemap URL on the target domain.
    #[must_use]
    pub fn sitemap_url(&self) -> String {
        format!(
            "{}{}",
            self.scraper_base_url.trim_end_matches('/'),
            self.scraper_sitemap_path
        )
    }

    #[must_use]
    pub fn ai_enabled(&self) -> bool {
        self.anthropic_api_key.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("scraper_base_url", &self.scraper_base_url)
            .field("scraper_sitemap_path", &self.scraper_sitemap_path)
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_rate_limit_ms", &self.scraper_rate_limit_ms)
            .field("scraper_concurrency", &self.scraper_concurrency)
            .field("scraper_max_attempts", &self.scraper_max_attempts)
            .field("scraper_retry_backoff_ms", &self.scraper_retry_backoff_ms)
            .field("scraper_headless", &self.scraper_headless)
            .field("scraper_render_timeout_ms", &self.scraper_render_timeout_ms)
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("anthropic_model", &self.anthropic_model)
            .field("anthropic_base_url", &self.anthropic_base_url)
            .finish()
    }
}
