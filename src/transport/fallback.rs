use super::{Outcome, Transport};
use crate::error::TransportResult;
use crate::request::RequestSpec;
use futures_core::future::BoxFuture;

/// Runs `primary`, and on any failure runs `secondary` exactly once with the
/// same request. The secondary's error is the one returned.
///
/// Upstream operations are not idempotent: if the primary partially
/// succeeded server-side, the secondary may repeat its side effect.
pub struct FallbackTransport {
    primary: Box<dyn Transport>,
    secondary: Box<dyn Transport>,
}

impl FallbackTransport {
    pub fn new(primary: Box<dyn Transport>, secondary: Box<dyn Transport>) -> Self {
        Self { primary, secondary }
    }
}

impl Transport for FallbackTransport {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn execute<'a>(&'a self, spec: &'a RequestSpec) -> BoxFuture<'a, TransportResult<Outcome>> {
        Box::pin(async move {
            match self.primary.execute(spec).await {
                Ok(out) => Ok(out),
                Err(e) => {
                    tracing::warn!(
                        primary = self.primary.name(),
                        secondary = self.secondary.name(),
                        error = %e,
                        "primary transport failed, trying fallback"
                    );
                    self.secondary.execute(spec).await
                }
            }
        })
    }
}
