use serde::Deserialize;

/// Main configuration structure for geomirror
///
/// Every field has a default, so the tool runs without a config file.
/// Values given on the command line take precedence over config values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub download: DownloadConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Overall per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("geomirror/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Download behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DownloadConfig {
    /// Number of parallel download workers (1 = sequential)
    pub workers: usize,

    /// Completion log insertions between flushes to disk
    pub log_flush_interval: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            log_flush_interval: 25,
        }
    }
}
