//! HTTP client abstraction for testability

use std::error::Error as _;

use async_trait::async_trait;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request to the given URL
    async fn get(&self, url: &str) -> crate::Result<HttpResponse>;

    /// Send a POST request with a JSON body
    async fn post_json(&self, url: &str, body: &serde_json::Value)
        -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Render an error together with its source chain.
///
/// reqwest only prints the outermost layer, which hides TLS and DNS causes.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            crate::VigilanteError::Http(format!("GET {} failed: {}", url, error_chain(&e)))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            crate::VigilanteError::Http(format!("Reading response body: {}", error_chain(&e)))
        })?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            crate::VigilanteError::Http(format!("POST {} failed: {}", url, error_chain(&e)))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            crate::VigilanteError::Http(format!("Reading response body: {}", error_chain(&e)))
        })?;

        tracing::debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}
