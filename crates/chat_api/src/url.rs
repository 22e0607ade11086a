use generation_provider::TransportMode;

use crate::error::ChatApiError;

/// Path of the OpenAI-compatible streaming chat endpoint.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
/// Path of the relay server's generate route.
pub const RELAY_GENERATE_PATH: &str = "/api/generate";

#[must_use]
pub fn path_for_mode(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Client => CHAT_COMPLETIONS_PATH,
        TransportMode::Server => RELAY_GENERATE_PATH,
    }
}

/// Resolve the request URL for an endpoint base address.
///
/// Normalization rules:
/// 1) trim whitespace and trailing slashes
/// 2) keep the address unchanged when it already ends with the mode's path
/// 3) append the mode's path otherwise
///
/// Only absolute `http`/`https` addresses are accepted.
pub fn endpoint_url(endpoint: &str, mode: TransportMode) -> Result<String, ChatApiError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ChatApiError::InvalidEndpoint(
            "endpoint is empty".to_owned(),
        ));
    }

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|error| ChatApiError::InvalidEndpoint(format!("{trimmed}: {error}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ChatApiError::InvalidEndpoint(format!(
            "{trimmed}: unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    let path = path_for_mode(mode);
    if trimmed.ends_with(path) {
        return Ok(trimmed.to_owned());
    }
    Ok(format!("{trimmed}{path}"))
}
