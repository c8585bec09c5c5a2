//! Blocking `Transport` backed by `ureq`.

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Sends requests with a shared `ureq::Agent`.
///
/// The agent is configured with `http_status_as_error(false)` so 4xx/5xx
/// responses come back as data and the client can report them as
/// `ApiError::HttpStatus`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a caller-configured agent (timeouts, proxies, TLS).
    ///
    /// The agent should not treat HTTP status codes as errors.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpMethod::Post = request.method;
        let mut builder = self.agent.post(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let result = builder.send(request.body.as_bytes());

        let mut response = result.map_err(|e| {
            TransportError::with_source(format!("{} {} failed", request.method.as_str(), request.url), e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(TransportError::body_read)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
