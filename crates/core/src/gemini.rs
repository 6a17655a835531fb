use crate::traits::TextCompletion;
use crate::CollaboratorError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

const BACKEND: &str = "gemini";
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// `generateContent` client for the Gemini API.
pub struct GeminiClient {
    client: Arc<Client>,
    url: Url,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<String>,
    ) -> Result<Self, CollaboratorError> {
        let url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            endpoint.trim_end_matches('/'),
            model
        ))?;

        let api_key = api_key.and_then(|value| {
            let key = value.trim().to_string();
            if key.is_empty() {
                None
            } else {
                Some(key)
            }
        });

        Ok(Self {
            client: Arc::new(Client::new()),
            url,
            api_key,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl TextCompletion for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CollaboratorError::NotConfigured("GOOGLE_API_KEY is not set".to_string()))?;

        let payload = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = self
            .client
            .post(self.url.clone())
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("{status}: {}", truncate(&body, ERROR_BODY_LIMIT)),
            });
        }

        let payload: GenerateResponse = response.json().await?;
        response_text(&payload)
    }
}

fn response_text(payload: &GenerateResponse) -> Result<String, CollaboratorError> {
    if let Some(reason) = payload
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(CollaboratorError::BackendResponse {
            backend: BACKEND.to_string(),
            details: format!("prompt blocked: {reason}"),
        });
    }

    let candidate = payload
        .candidates
        .first()
        .ok_or_else(|| CollaboratorError::EmptyResponse(BACKEND.to_string()))?;

    let text = candidate
        .content
        .as_ref()
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(match &candidate.finish_reason {
            Some(reason) if reason != "STOP" => CollaboratorError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("generation stopped: {reason}"),
            },
            _ => CollaboratorError::EmptyResponse(BACKEND.to_string()),
        });
    }

    Ok(text)
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
