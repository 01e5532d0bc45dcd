use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::LLMConfig;
use crate::types::{AppError, AppResult, LLMMessage, LLMProvider, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider: LLMProvider,
}

impl LLM {
    /// Build the adapter named by `config.provider`.
    pub fn from_config(config: &LLMConfig) -> AppResult<Self> {
        let provider = LLMProvider::parse(&config.provider)?;
        let client = http_client(config.timeout())?;

        let adapter: Box<dyn LLMAdapter> = match provider {
            LLMProvider::Ollama => Box::new(crate::llm::ollama::OllamaAdapter::new(
                client,
                &config.base_url,
            )),
            LLMProvider::OpenAICompat => Box::new(crate::llm::openai_compat::OpenAICompatAdapter::new(
                client,
                &config.base_url,
                config.api_key.clone(),
            )),
        };

        info!("Using {} model server at {}", provider, config.base_url);
        Ok(Self::with_adapter(provider, adapter))
    }

    pub fn with_adapter(provider: LLMProvider, adapter: Box<dyn LLMAdapter>) -> Self {
        Self { adapter, provider }
    }

    pub fn provider(&self) -> &LLMProvider {
        &self.provider
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }

    /// One-shot chat: a single user message, the assistant's reply text back.
    pub async fn ask(&self, model: &str, content: impl Into<String>) -> AppResult<String> {
        let request = LLMRequest {
            model: model.to_string(),
            messages: vec![LLMMessage::user(content)],
        };

        let started = std::time::Instant::now();
        info!("Running {} with model {}", self.provider, model);
        let response = self.create_chat_completion(&request).await?;
        info!(
            "Model {} answered in {}ms ({} characters)",
            model,
            started.elapsed().as_millis(),
            response.content.len()
        );
        debug!("Model output: {}", response.content);

        Ok(response.content)
    }
}

fn http_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// Join a base URL and an API path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenUsage;
    use std::sync::{Arc, Mutex};

    struct RecordingAdapter {
        seen: Arc<Mutex<Vec<LLMRequest>>>,
    }

    #[async_trait]
    impl LLMAdapter for RecordingAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(LLMResponse {
                content: "4".to_string(),
                finish_reason: Some("stop".to_string()),
                usage: Some(TokenUsage {
                    prompt_tokens: 5,
                    completion_tokens: 1,
                    total_tokens: 6,
                }),
            })
        }
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(endpoint("http://localhost:11434/", "/api/chat"), "http://localhost:11434/api/chat");
        assert_eq!(endpoint("http://localhost:11434", "api/chat"), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_unknown_provider_is_error() {
        let config = LLMConfig {
            provider: "carrier-pigeon".to_string(),
            ..LLMConfig::default()
        };
        assert!(LLM::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_selects_provider() {
        let llm = LLM::from_config(&LLMConfig::default()).unwrap();
        assert_eq!(llm.provider(), &LLMProvider::Ollama);

        let config = LLMConfig {
            provider: "openai".to_string(),
            ..LLMConfig::default()
        };
        let llm = LLM::from_config(&config).unwrap();
        assert_eq!(llm.provider(), &LLMProvider::OpenAICompat);
    }

    #[tokio::test]
    async fn test_ask_sends_single_user_message() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let llm = LLM::with_adapter(
            LLMProvider::Ollama,
            Box::new(RecordingAdapter { seen: seen.clone() }),
        );

        let answer = llm.ask("gemma3n:e2b", "What is 2+2?").await.unwrap();
        assert_eq!(answer, "4");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gemma3n:e2b");
        assert_eq!(seen[0].messages, vec![LLMMessage::user("What is 2+2?")]);
    }
}
