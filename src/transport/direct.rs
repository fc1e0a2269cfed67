use super::{HeaderProfile, Outcome, StreamDetector, Transport};
use crate::error::{TransportError, TransportResult};
use crate::request::RequestSpec;
use crate::stream;
use futures_core::future::BoxFuture;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Response;

/// Calls the upstream API itself.
#[derive(Debug, Clone)]
pub struct DirectTransport {
    http: reqwest::Client,
    headers: HeaderProfile,
    detector: StreamDetector,
}

impl DirectTransport {
    pub fn new(http: reqwest::Client, headers: HeaderProfile, detector: StreamDetector) -> Self {
        Self {
            http,
            headers,
            detector,
        }
    }

    async fn send(&self, spec: &RequestSpec) -> TransportResult<Response> {
        let mut headers = self.headers.to_header_map()?;
        if let Some(cred) = &spec.credential {
            let v = HeaderValue::from_str(cred.as_header_value())
                .map_err(|e| TransportError::InvalidRequest(format!("authorization: {e}")))?;
            headers.insert(AUTHORIZATION, v);
        }

        tracing::info!(url = %spec.url, method = %spec.method, "sending upstream request");
        self.http
            .request(spec.method.clone(), spec.url.clone())
            .headers(headers)
            .json(&spec.payload)
            .send()
            .await
            .map_err(TransportError::Network)
    }
}

impl Transport for DirectTransport {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn execute<'a>(&'a self, spec: &'a RequestSpec) -> BoxFuture<'a, TransportResult<Outcome>> {
        Box::pin(async move {
            let resp = self.send(spec).await?;
            let status = resp.status();
            tracing::debug!(%status, "upstream responded");

            if !status.is_success() {
                let body = resp
                    .text()
                    .await
                    .unwrap_or_else(|e| format!("<body unavailable: {e}>"));
                tracing::warn!(%status, body = %body, "upstream request failed");
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if self.detector.is_streaming(&spec.url, content_type.as_deref()) {
                let result = stream::collect(resp.bytes_stream()).await;
                return Ok(Outcome::Stream(result));
            }

            let text = resp
                .text()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()))?;
            Ok(parse_body(text))
        })
    }
}

/// JSON if it parses, raw text otherwise.
pub fn parse_body(text: String) -> Outcome {
    match serde_json::from_str(&text) {
        Ok(v) => Outcome::Json(v),
        Err(_) => Outcome::Text(text),
    }
}
