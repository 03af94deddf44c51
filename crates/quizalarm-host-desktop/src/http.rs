//! HTTP transport over reqwest

use quizalarm_host_api::{HostError, HostResult, HttpMethod, HttpRequest, HttpResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Connection timeout applied to every request; each request adds its own
/// overall timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> HostResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("quizalarmd/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HostError::Internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub async fn send(&self, request: HttpRequest) -> HostResult<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
        }
        .timeout(timeout);

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        debug!(method = method.as_str(), url = %url, "Sending request");

        let response = builder.send().await.map_err(|e| map_error(e, timeout))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| map_error(e, timeout))?;

        debug!(url = %url, status, "Response received");
        Ok(HttpResponse::new(status, text))
    }
}

fn map_error(e: reqwest::Error, timeout: Duration) -> HostError {
    if e.is_timeout() {
        HostError::Timeout(timeout)
    } else {
        HostError::Transport(e.to_string())
    }
}
