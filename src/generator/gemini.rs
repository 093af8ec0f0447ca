//! Google Gemini generation client.
//!
//! Thin REST client for the `generateContent` endpoint. Requests always
//! carry the web search tool so generated pages are grounded in live
//! search results rather than model memory alone.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::GeneratorConfig;
use crate::errors::GenerationError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Document generation collaborator. The production implementation calls
/// Gemini; tests substitute scripted responses.
#[async_trait]
pub trait PageGenerator: Send + Sync {
    async fn generate_page(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    tools: Vec<GeminiTool>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

/// Tool declaration enabling grounded web search during generation.
#[derive(Debug, Serialize)]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

impl GeminiClient {
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .resolved_api_key()
            .ok_or(GenerationError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            model: config.model.clone(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl PageGenerator for GeminiClient {
    async fn generate_page(&self, prompt: &str) -> Result<String, GenerationError> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            tools: vec![GeminiTool {
                google_search: GoogleSearch {},
            }],
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        debug!(
            "Sending generation request to {}",
            url.replace(&self.api_key, "***")
        );

        let response = self.client.post(&url).json(&request_body).send().await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Generation API error: {} - {}", status, response_text);
            return Err(GenerationError::api(status.as_u16(), response_text));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| GenerationError::InvalidResponse(format!("Malformed body: {}", e)))?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                "Generation usage - prompt: {:?} tokens, response: {:?} tokens, total: {:?} tokens",
                usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
            );
        }

        extract_text(gemini_response)
    }
}

/// Pull the generated document out of a response. Grounded generations can
/// split output across several parts, so all part texts are concatenated.
fn extract_text(response: GeminiResponse) -> Result<String, GenerationError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidResponse("No candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(GenerationError::InvalidResponse(
            "Empty response text".to_string(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GeneratorConfig {
        GeneratorConfig {
            model: "gemini-2.5-flash-lite".to_string(),
            api_key: Some("test-key".to_string()),
            timeout_seconds: 30,
            region: "Zimbabwe".to_string(),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new(&test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_request_carries_search_tool_and_user_role() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: "generate".to_string(),
                }],
            }],
            tools: vec![GeminiTool {
                google_search: GoogleSearch {},
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "generate");
        assert!(json["tools"][0]["google_search"].is_object());
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [
                            {"text": "<!DOCTYPE html><html>"},
                            {"text": "<body>Hello</body></html>"}
                        ]
                    }
                }],
                "usageMetadata": {"promptTokenCount": 10, "totalTokenCount": 50}
            }"#,
        )
        .unwrap();

        let text = extract_text(response).unwrap();
        assert_eq!(text, "<!DOCTYPE html><html><body>Hello</body></html>");
    }

    #[test]
    fn test_extract_text_rejects_empty_candidates() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_extract_text_rejects_blank_output() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::InvalidResponse(_))
        ));
    }
}
