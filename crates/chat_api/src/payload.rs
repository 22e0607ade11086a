use generation_provider::{GenerationRequest, Language};
use serde::{Deserialize, Serialize};

use crate::instructions::instructions_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    /// Default: true.
    #[serde(default = "default_true")]
    pub stream: bool,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl ChatCompletionRequest {
    /// System instructions for the request language followed by the source text.
    pub fn for_generation(request: &GenerationRequest) -> Self {
        Self {
            model: request.model.trim().to_owned(),
            stream: true,
            messages: vec![
                ChatMessage::new(ChatRole::System, instructions_for(request.language)),
                ChatMessage::new(ChatRole::User, request.text.clone()),
            ],
            temperature: None,
        }
    }
}

/// Request body for the relay server's `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayGenerateRequest {
    pub text: String,
    pub lang: Language,
    pub model: String,
}

impl RelayGenerateRequest {
    pub fn for_generation(request: &GenerationRequest) -> Self {
        Self {
            text: request.text.clone(),
            lang: request.language,
            model: request.model.trim().to_owned(),
        }
    }
}
