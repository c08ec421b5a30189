//! HTTP client construction
//!
//! One client is shared by the explorer and the download workers. Redirects
//! are followed with reqwest's default policy; requests carry no headers
//! beyond the User-Agent and no conditional-request support.

use crate::config::HttpConfig;
use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client used for listing fetches and downloads
///
/// # Arguments
///
/// * `config` - The HTTP configuration (timeouts, user agent)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}
