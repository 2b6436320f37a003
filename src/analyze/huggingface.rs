//! Thin client for the Hugging Face Inference API.
//!
//! One shared `reqwest::Client` with connect/request timeouts; every call is
//! `POST {base_url}/models/{model}` with a bearer token. Non-2xx statuses and
//! undecodable bodies map to [`CollaboratorError`]. No retries.

use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::config::HfConfig;
use crate::error::CollaboratorError;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

#[derive(Clone)]
pub struct HfInferenceClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl std::fmt::Debug for HfInferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token.
        f.debug_struct("HfInferenceClient")
            .field("base_url", &self.base_url)
            .field("token_len", &self.api_token.len())
            .finish()
    }
}

impl HfInferenceClient {
    pub fn new(base_url: &str, api_token: String, timeout: Duration) -> Result<Self, CollaboratorError> {
        let http = reqwest::Client::builder()
            .user_agent("trade-incident-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn from_config(cfg: &HfConfig) -> Result<Self, CollaboratorError> {
        Self::new(
            &cfg.base_url,
            cfg.api_token.clone(),
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    pub async fn infer<B, R>(&self, model: &str, body: &B) -> Result<R, CollaboratorError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        if self.api_token.is_empty() {
            return Err(CollaboratorError::MissingToken);
        }

        let resp = self
            .http
            .post(self.model_url(model))
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(model, status = status.as_u16(), "inference call rejected");
            return Err(CollaboratorError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| CollaboratorError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_url_joins_without_double_slash() {
        let c = HfInferenceClient::new("https://hf.example/", "t".into(), Duration::from_secs(1)).unwrap();
        assert_eq!(c.model_url("org/model"), "https://hf.example/models/org/model");
    }

    #[test]
    fn debug_output_hides_token() {
        let c = HfInferenceClient::new(DEFAULT_BASE_URL, "secret-token".into(), Duration::from_secs(1)).unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-token"));
        assert!(dbg.contains("token_len"));
    }

    #[tokio::test]
    async fn empty_token_short_circuits() {
        let c = HfInferenceClient::new(DEFAULT_BASE_URL, String::new(), Duration::from_secs(1)).unwrap();
        let res: Result<serde_json::Value, _> = c.infer("m", &serde_json::json!({})).await;
        assert!(matches!(res, Err(CollaboratorError::MissingToken)));
    }
}
