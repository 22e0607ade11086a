//! Transport-only chat-completion client primitives.
//!
//! This crate owns request building, dispatch, and response framing for the
//! two supported transport modes: calling an OpenAI-compatible
//! `/v1/chat/completions` endpoint directly, or calling a relay server's
//! `/api/generate` route that streams plain text or forwards the upstream
//! event stream. It contains no session
//! state and no persistence.
//!
//! [`ChatApiClient`] implements [`generation_provider::Transport`]; body
//! decoding is left to the caller, with [`SseStreamParser`] available for the
//! chat-completion framing.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod instructions;
pub mod payload;
pub mod retry;
pub mod sse;
pub mod url;

pub use client::ChatApiClient;
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use instructions::instructions_for;
pub use payload::{ChatCompletionRequest, ChatMessage, ChatRole, RelayGenerateRequest};
pub use sse::{ChatStreamEvent, SseStreamParser};
pub use url::endpoint_url;
