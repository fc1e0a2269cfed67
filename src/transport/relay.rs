use super::{Outcome, StreamDetector, Transport};
use crate::error::{TransportError, TransportResult};
use crate::relay::{self, ErrorBody, ProxyRequest};
use crate::request::RequestSpec;
use futures_core::future::BoxFuture;
use reqwest::Url;

/// Sends requests through a relay endpoint (`POST /api/proxy`).
#[derive(Debug, Clone)]
pub struct RelayTransport {
    http: reqwest::Client,
    endpoint: Url,
    detector: StreamDetector,
}

impl RelayTransport {
    pub fn new(http: reqwest::Client, endpoint: Url, detector: StreamDetector) -> Self {
        Self {
            http,
            endpoint,
            detector,
        }
    }

    fn wrap(spec: &RequestSpec) -> ProxyRequest {
        ProxyRequest {
            url: spec.url.to_string(),
            method: spec.method.to_string(),
            data: spec.payload.clone(),
            auth_token: spec
                .credential
                .as_ref()
                .map(|c| c.as_header_value().to_string())
                .unwrap_or_default(),
        }
    }
}

impl Transport for RelayTransport {
    fn name(&self) -> &'static str {
        "relay"
    }

    fn execute<'a>(&'a self, spec: &'a RequestSpec) -> BoxFuture<'a, TransportResult<Outcome>> {
        Box::pin(async move {
            tracing::info!(relay = %self.endpoint, url = %spec.url, "sending request via relay");

            let resp = self
                .http
                .post(self.endpoint.clone())
                .json(&Self::wrap(spec))
                .send()
                .await
                .map_err(TransportError::Network)?;

            let status = resp.status();
            let text = resp
                .text()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()))?;

            if !status.is_success() {
                // Relay errors arrive as `{message}`; otherwise report the status alone.
                let message = serde_json::from_str::<ErrorBody>(&text)
                    .map(|b| b.message)
                    .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
                tracing::warn!(%status, message = %message, "relay request failed");
                return Err(TransportError::Relay {
                    status: status.as_u16(),
                    message,
                });
            }

            let value: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| TransportError::Decode(format!("relay body is not JSON: {e}")))?;
            Ok(relay::decode_body(value, self.detector.is_stream_route(&spec.url)))
        })
    }
}
