use crate::error::{TransportError, TransportResult};
use crate::request::{Credential, RequestSpec};
use crate::transport::{Outcome, Transport};
use anyhow::Context;
use reqwest::Url;
use serde::Serialize;
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "https://api-v2.aifiesta.ai/api";
pub const DEFAULT_MODEL_COUNT: u32 = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub id: String,
    pub title: String,
    pub folder_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPayload {
    pub chat_id: String,
    pub model: String,
    pub model_count: u32,
    pub asset_ids: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub group_id: String,
    pub prompt: String,
    pub assistant_message_id: String,
}

impl CompletionPayload {
    pub fn text(chat_id: &str, model: &str, prompt: &str, model_count: u32) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            model: model.to_string(),
            model_count,
            asset_ids: Vec::new(),
            kind: "text".to_string(),
            group_id: new_id(),
            prompt: prompt.to_string(),
            assistant_message_id: new_id(),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Client for the chat API's two operations.
pub struct FiestaClient {
    transport: Box<dyn Transport>,
    base_url: Url,
    credential: Option<Credential>,
    model_count: u32,
}

impl FiestaClient {
    pub fn new(
        transport: Box<dyn Transport>,
        base_url: &str,
        credential: Option<Credential>,
        model_count: u32,
    ) -> anyhow::Result<Self> {
        // `Url::join` drops the last segment unless the base ends with '/'.
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&base).with_context(|| format!("invalid base URL: {base_url}"))?;
        Ok(Self {
            transport,
            base_url,
            credential,
            model_count,
        })
    }

    fn endpoint(&self, path: &str) -> TransportResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidRequest(format!("endpoint {path}: {e}")))
    }

    async fn post<T: Serialize>(&self, path: &str, payload: &T) -> TransportResult<Outcome> {
        let payload = serde_json::to_value(payload)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let spec = RequestSpec::post(self.endpoint(path)?, payload, self.credential.clone());
        self.transport.execute(&spec).await
    }

    /// Create a chat and return its (client-generated) id.
    pub async fn create_chat(&self, title: &str) -> TransportResult<String> {
        let payload = ChatPayload {
            id: new_id(),
            title: title.to_string(),
            folder_id: None,
        };
        let out = self.post("chat", &payload).await?;
        tracing::debug!(chat_id = %payload.id, response = ?out, "chat created");
        Ok(payload.id)
    }

    pub async fn request_completion(
        &self,
        chat_id: &str,
        prompt: &str,
        model: &str,
    ) -> TransportResult<Outcome> {
        let payload = CompletionPayload::text(chat_id, model, prompt, self.model_count);
        self.post("chat/completions", &payload).await
    }

    /// Create a chat, then request a completion in it.
    pub async fn ask(&self, title: &str, prompt: &str, model: &str) -> anyhow::Result<Outcome> {
        let chat_id = self
            .create_chat(title)
            .await
            .context("failed to create chat")?;
        tracing::info!(%chat_id, model, "chat ready, requesting completion");
        self.request_completion(&chat_id, prompt, model)
            .await
            .context("completion request failed")
    }
}
