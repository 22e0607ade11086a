use std::fmt;

use generation_provider::TransportFailure;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum ChatApiError {
    MissingCredential,
    InvalidEndpoint(String),
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    Serde(JsonError),
    RetryExhausted {
        status: Option<StatusCode>,
        last_error: Option<String>,
    },
    Cancelled,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadValue>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorPayloadValue {
    Text(String),
    Fields(ErrorPayloadFields),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

impl ErrorPayloadValue {
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Text(text) => non_empty_string(text).map(ToOwned::to_owned),
            Self::Fields(fields) => fields
                .message
                .as_deref()
                .and_then(non_empty_string)
                .or_else(|| fields.code.as_deref().and_then(non_empty_string))
                .or_else(|| fields.type_.as_deref().and_then(non_empty_string))
                .map(ToOwned::to_owned),
        }
    }
}

impl fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "API credential is required"),
            Self::InvalidEndpoint(value) => write!(f, "invalid endpoint: {value}"),
            Self::InvalidHeader(value) => write!(f, "invalid header: {value}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::RetryExhausted { status, last_error } => {
                let status = status
                    .map(|status| status.as_u16().to_string())
                    .unwrap_or_else(|| "n/a".to_owned());
                write!(f, "retry exhausted after max attempts (status: {status}, last_error: {last_error:?})")
            }
            Self::Cancelled => write!(f, "request was cancelled"),
        }
    }
}

impl std::error::Error for ChatApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for ChatApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

impl From<ChatApiError> for TransportFailure {
    fn from(error: ChatApiError) -> Self {
        match error {
            ChatApiError::Status(status, body) => TransportFailure::Status {
                status: status.as_u16(),
                body,
            },
            ChatApiError::Cancelled => TransportFailure::Cancelled,
            other => TransportFailure::connection(other.to_string()),
        }
    }
}

/// Extract a human-readable message from a non-success response body.
///
/// Accepts `{"error":{"message":..}}`, `{"error":".."}` and `{"message":..}`
/// JSON shapes, then falls back to the raw body, then to the status reason.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(trimmed) {
        if let Some(message) = payload.value.as_ref().and_then(ErrorPayloadValue::message) {
            return message;
        }
        if let Some(message) = payload.message.as_deref().and_then(non_empty_string) {
            return message.to_owned();
        }
    }

    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

fn non_empty_string(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
