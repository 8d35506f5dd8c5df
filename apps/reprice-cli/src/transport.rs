//! Blocking HTTP adapter for the remote price service.

use std::time::Duration;

use reprice_client::{ClientError, ClientResult, HttpResponse, HttpTransport};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use url::Url;

/// [`HttpTransport`] over a blocking `reqwest` client with a request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("building HTTP client: {}", e)))?;
        Ok(ReqwestTransport { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &Url) -> ClientResult<HttpResponse> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ClientError::Transport(format!("reading response body: {}", e)))?;

        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_refused_is_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let url = Url::parse("http://127.0.0.1:1/prices").unwrap();

        assert!(matches!(transport.get(&url), Err(ClientError::Transport(_))));
    }
}
