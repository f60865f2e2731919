use reqwest::Client as HttpClient;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use super::{ extract_reply, ChatClient, ChatRequest };
use crate::llm::error::UpstreamError;
use crate::llm::BackendConfig;
use log::{ debug, error };

const BODY_LOG_LIMIT: usize = 512;

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration
    ) -> Result<Self, UpstreamError> {
        let http = HttpClient::builder().timeout(timeout).build().map_err(UpstreamError::Transport)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, UpstreamError> {
        Self::new(config.base_url.clone(), config.api_key.clone(), config.timeout)
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String, UpstreamError> {
        let url = self.chat_url();
        debug!("POST {} (model={}, {} messages)", url, request.model, request.messages.len());

        let mut req = self.http.post(&url).json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key.trim());
        }

        let resp = req
            .send().await
            .map_err(|e| UpstreamError::from_transport(e, &url, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                "Inference backend error response: status={}, body={}",
                status,
                truncate(&body)
            );
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }

        let bytes = resp
            .bytes().await
            .map_err(|e| UpstreamError::from_transport(e, &url, self.timeout))?;
        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            UpstreamError::Protocol(format!("body is not JSON ({}): {}", e, truncate(&String::from_utf8_lossy(&bytes))))
        })?;

        extract_reply(&body).ok_or_else(|| UpstreamError::Protocol(truncate(&body.to_string())))
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(BODY_LOG_LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_url_has_single_slash() {
        let client = OllamaClient::new(
            "http://localhost:11434/".into(),
            None,
            Duration::from_secs(5)
        ).unwrap();
        assert_eq!(client.chat_url(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn blank_key_is_not_sent() {
        let client = OllamaClient::new(
            "http://localhost:11434".into(),
            Some("  ".into()),
            Duration::from_secs(5)
        ).unwrap();
        assert!(client.api_key.is_none());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "é".repeat(BODY_LOG_LIMIT + 10);
        let cut = truncate(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), BODY_LOG_LIMIT + 3);
        assert_eq!(truncate("short"), "short");
    }
}
