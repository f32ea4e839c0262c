use std::time::Duration;

use log::info;
use reqwest::blocking::{Client, Response};

use crate::error::PrettyXmlError;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("prettyxml/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Blocking HTTP client fetching input documents. One request per call, no
/// retries.
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, PrettyXmlError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Download the document at `url`.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, PrettyXmlError> {
        info!("Fetching {}", url);
        let response = self.client.get(url).send()?;
        let response = check_status(url, response)?;
        Ok(response.bytes()?.to_vec())
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

fn check_status(url: &str, response: Response) -> Result<Response, PrettyXmlError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(PrettyXmlError::HttpStatus {
        url: url.to_string(),
        status: status.as_u16(),
        message: format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        ),
    })
}
