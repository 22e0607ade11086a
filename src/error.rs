use generation_provider::TransportFailure;
use studio_store::StoreError;
use thiserror::Error;

/// Settings that must be present before a request may be dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("source text is empty")]
    EmptyText,
    #[error("no model is selected")]
    MissingModel,
    #[error("API credential is required for client-issued requests")]
    MissingCredential,
    #[error("endpoint is not configured")]
    MissingEndpoint,
}

/// Classified failure of one generation session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Configuration Error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Server Error: {}", format_server_error(.status, .body))]
    Server { status: Option<u16>, body: String },

    #[error("Stream Decode Error: {0}")]
    StreamDecode(String),

    #[error("History Error: {0}")]
    Persistence(String),
}

fn format_server_error(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(status) => format!("{status} {body}"),
        None => body.to_owned(),
    }
}

impl From<TransportFailure> for GenerationError {
    fn from(failure: TransportFailure) -> Self {
        match failure {
            TransportFailure::Connection { message } => Self::Transport(message),
            TransportFailure::Status { status, body } => Self::Server {
                status: Some(status),
                body,
            },
            TransportFailure::Cancelled => Self::Transport(failure.to_string()),
        }
    }
}

impl From<StoreError> for GenerationError {
    fn from(error: StoreError) -> Self {
        Self::Persistence(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use generation_provider::TransportFailure;

    use super::{ConfigurationError, GenerationError};

    #[test]
    fn server_errors_carry_prefix_and_status() {
        let error = GenerationError::from(TransportFailure::Status {
            status: 401,
            body: "Incorrect API key".to_owned(),
        });
        assert_eq!(error.to_string(), "Server Error: 401 Incorrect API key");

        let streamed = GenerationError::Server {
            status: None,
            body: "overloaded".to_owned(),
        };
        assert_eq!(streamed.to_string(), "Server Error: overloaded");
    }

    #[test]
    fn connection_failures_are_transport_errors() {
        let error = GenerationError::from(TransportFailure::connection("connection refused"));
        assert_eq!(
            error,
            GenerationError::Transport("connection refused".to_owned())
        );
        assert_eq!(
            GenerationError::from(ConfigurationError::MissingCredential).to_string(),
            "Configuration Error: API credential is required for client-issued requests"
        );
    }
}
