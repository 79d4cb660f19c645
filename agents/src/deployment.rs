//! Hosted chat-completion deployment, addressed the Azure OpenAI way:
//! one deployment name per agent, shared endpoint and key.

use crate::{Gateway, GatewayError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Provider settings shared by every deployment in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub const DEFAULT_API_VERSION: &'static str = "2024-05-13";

    /// Chat-completions URL for `deployment`.
    pub fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            deployment,
            self.api_version
        )
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Pulls the first choice's text out of a chat-completions body.
fn extract_content(body: &str) -> Result<String, GatewayError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or(GatewayError::EmptyCompletion)
}

pub struct DeploymentGateway {
    name: String,
    deployment: String,
    config: ProviderConfig,
    client: reqwest::blocking::Client,
}

impl DeploymentGateway {
    pub fn new(deployment: impl Into<String>, config: ProviderConfig) -> Result<Self, GatewayError> {
        if config.endpoint.trim().is_empty() {
            return Err(GatewayError::NotConfigured(
                "AZURE_OPENAI_ENDPOINT is not set".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::NotConfigured(
                "AZURE_OPENAI_API_KEY is not set".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let deployment = deployment.into();
        Ok(Self {
            name: format!("deployment:{deployment}"),
            deployment,
            config,
            client,
        })
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    fn classify(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.config.timeout)
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl Gateway for DeploymentGateway {
    fn generate(&mut self, prompt: &str) -> Result<String, GatewayError> {
        let url = self.config.completions_url(&self.deployment);
        let request = ChatRequest {
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        debug!(deployment = %self.deployment, prompt_len = prompt.len(), "requesting completion");
        let response = self
            .client
            .post(&url)
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().map_err(|e| self.classify(e))?;
        if !status.is_success() {
            warn!(deployment = %self.deployment, status = status.as_u16(), "completion request failed");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_content(&body)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            endpoint: "https://example.openai.azure.com/".to_string(),
            api_key: "secret".to_string(),
            api_version: ProviderConfig::DEFAULT_API_VERSION.to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            config().completions_url("gpt-deployment-1"),
            "https://example.openai.azure.com/openai/deployments/gpt-deployment-1/chat/completions?api-version=2024-05-13"
        );
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  e4\n"}}]}"#;
        assert_eq!(extract_content(body), Ok("e4".to_string()));

        let empty = r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#;
        assert_eq!(extract_content(empty), Ok(String::new()));
    }

    #[test]
    fn test_missing_content_is_a_failure() {
        assert_eq!(
            extract_content(r#"{"choices":[]}"#),
            Err(GatewayError::EmptyCompletion)
        );
        assert_eq!(
            extract_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(GatewayError::EmptyCompletion)
        );
        assert_eq!(extract_content("{}"), Err(GatewayError::EmptyCompletion));
        assert!(matches!(
            extract_content("<html>"),
            Err(GatewayError::Decode(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            messages: [ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": [{"role": "user", "content": "hello"}],
                "temperature": 0.5
            })
        );
    }

    #[test]
    fn test_requires_credentials() {
        let mut missing_key = config();
        missing_key.api_key.clear();
        assert!(matches!(
            DeploymentGateway::new("d", missing_key),
            Err(GatewayError::NotConfigured(_))
        ));

        let mut missing_endpoint = config();
        missing_endpoint.endpoint.clear();
        assert!(matches!(
            DeploymentGateway::new("d", missing_endpoint),
            Err(GatewayError::NotConfigured(_))
        ));
    }
}
