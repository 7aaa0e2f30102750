use async_trait::async_trait;
use lexitrack_common::{EnhanceError, EnhancementRequest, EnhancementResult, GenerationError, NoteEnhancer};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::prompt::NotesPrompt;

const SCHEMA_NAME: &str = "enhance_notes_output";

/// Where the text-generation backend lives and which model to ask.
#[derive(Debug, Clone)]
pub struct EnhancerConfig {
    /// Base URL of an OpenAI-compatible API, e.g. "https://api.openai.com/v1".
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid AI backend url {0:?}")]
    InvalidBaseUrl(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid prompt template: {0}")]
    Template(#[from] tera::Error),
}

/// Asks an OpenAI-compatible chat completions endpoint for discussion
/// questions, constraining the reply to the suggestion schema. One attempt per
/// call, no client-side timeout.
pub struct AiNoteEnhancer {
    config: EnhancerConfig,
    endpoint: Url,
    client: Client,
    prompt: NotesPrompt,
}

impl AiNoteEnhancer {
    pub fn new(config: EnhancerConfig) -> Result<Self, ConfigError> {
        let mut endpoint = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|_| ConfigError::InvalidBaseUrl(config.base_url.clone()))?;

        endpoint
            .path_segments_mut()
            .map_err(|_| ConfigError::InvalidBaseUrl(config.base_url.clone()))?
            .pop_if_empty()
            .extend(["chat", "completions"]);

        let client = Client::builder().build()?;
        let prompt = NotesPrompt::new()?;

        Ok(Self {
            config,
            endpoint,
            client,
            prompt,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn request_completion(&self, prompt: &str) -> Result<ChatCompletionResponse, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: SCHEMA_NAME,
                    strict: true,
                    schema: EnhancementResult::json_schema(),
                },
            },
        };

        debug!("AI backend url: {}, model: {}", self.endpoint, self.config.model);

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {}", api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.into()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.into()))?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(GenerationError::InvalidResponse)
    }
}

#[async_trait]
impl NoteEnhancer for AiNoteEnhancer {
    async fn enhance_notes(&self, request: &EnhancementRequest) -> Result<EnhancementResult, EnhanceError> {
        info!("Requesting discussion questions for {:?}", request.book_title());

        let prompt = self
            .prompt
            .render(request)
            .map_err(|e| GenerationError::Prompt(e.into()))?;

        let response = self
            .request_completion(&prompt)
            .await
            .inspect_err(|e| warn!("AI backend request failed: {}", e))?;

        let result = structured_output(response)?;
        info!("Received {} suggested questions", result.suggested_questions.len());

        Ok(result)
    }
}

/// An absent reply is a failure; a well-formed empty list is not.
fn structured_output(response: ChatCompletionResponse) -> Result<EnhancementResult, GenerationError> {
    let Some(message) = response.choices.into_iter().next().map(|c| c.message) else {
        warn!("AI backend returned no choices");
        return Err(GenerationError::MissingOutput);
    };

    let content = match message.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => {
            if let Some(refusal) = message.refusal {
                warn!("AI backend refused to answer: {}", refusal);
            }
            return Err(GenerationError::MissingOutput);
        }
    };

    serde_json::from_str(&content).map_err(GenerationError::MalformedOutput)
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat {
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}
