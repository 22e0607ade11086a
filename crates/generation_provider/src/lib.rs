//! Minimal provider-agnostic contract for one streamed text generation.
//!
//! This crate defines the request value types, the revocable cancellation
//! token shared by a session and its transport, and the transport seam
//! itself. It excludes wire formats, persistence, and session orchestration.

mod cancel;

use std::fmt;
use std::pin::Pin;

use futures_util::future::BoxFuture;
use futures_util::Stream;
use serde::{Deserialize, Serialize};

pub use cancel::{CancelToken, CancellationCoordinator, SessionId};

/// Target language/profile selector for a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Zh,
}

impl Language {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "zh" => Some(Self::Zh),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::En => Self::Zh,
            Self::Zh => Self::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who issues the upstream model request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// The client calls the chat-completion endpoint itself with its own credential.
    #[default]
    Client,
    /// The client calls a relay server that owns the upstream credential.
    Server,
}

impl TransportMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "client" => Some(Self::Client),
            "server" => Some(Self::Server),
            _ => None,
        }
    }

    /// Returns true when requests must carry a client-supplied credential.
    #[must_use]
    pub fn requires_credential(self) -> bool {
        matches!(self, Self::Client)
    }
}

/// Connection settings resolved for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub credential: String,
    pub endpoint: String,
    pub transport_mode: TransportMode,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let credential = if self.credential.is_empty() {
            "<empty>"
        } else {
            "<redacted>"
        };
        f.debug_struct("ConnectionSettings")
            .field("credential", &credential)
            .field("endpoint", &self.endpoint)
            .field("transport_mode", &self.transport_mode)
            .finish()
    }
}

/// Immutable input to one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub text: String,
    pub language: Language,
    pub model: String,
    pub connection: ConnectionSettings,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        language: Language,
        model: impl Into<String>,
        connection: ConnectionSettings,
    ) -> Self {
        Self {
            text: text.into(),
            language,
            model: model.into(),
            connection,
        }
    }
}

/// Body framing of a successful streamed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Raw UTF-8 text fragments.
    PlainText,
    /// Server-sent events carrying chat-completion deltas.
    ChatCompletionSse,
}

/// Failure reported by a transport before or during streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request could not be sent or the connection broke.
    Connection { message: String },
    /// The endpoint answered with a non-success status.
    Status { status: u16, body: String },
    /// The transport observed a revoked token and gave up.
    Cancelled,
}

impl TransportFailure {
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection { message } => f.write_str(message),
            Self::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            Self::Cancelled => f.write_str("request was cancelled"),
        }
    }
}

impl std::error::Error for TransportFailure {}

/// Raw body chunks in wire order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, TransportFailure>> + Send>>;

/// Successful response body handed to the stream consumer.
pub struct StreamHandle {
    pub framing: Framing,
    pub chunks: ChunkStream,
}

impl StreamHandle {
    pub fn new<S>(framing: Framing, chunks: S) -> Self
    where
        S: Stream<Item = Result<Vec<u8>, TransportFailure>> + Send + 'static,
    {
        Self {
            framing,
            chunks: Box::pin(chunks),
        }
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("framing", &self.framing)
            .finish_non_exhaustive()
    }
}

/// Transport interface for dispatching one streaming request.
///
/// Implementations resolve once response headers are available. They may
/// watch `token` to abandon dispatch early; the stream consumer re-checks it
/// before every delivery regardless.
pub trait Transport: Send + Sync + 'static {
    fn send<'a>(
        &'a self,
        request: &'a GenerationRequest,
        token: &'a CancelToken,
    ) -> BoxFuture<'a, Result<StreamHandle, TransportFailure>>;
}
