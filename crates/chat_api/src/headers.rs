use std::collections::BTreeMap;

use generation_provider::{ConnectionSettings, TransportMode};

use crate::config::ChatApiConfig;
use crate::error::ChatApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for one request.
///
/// Client-issued requests must carry a credential. Relay requests forward a
/// credential only when one is configured.
pub fn build_headers(
    config: &ChatApiConfig,
    connection: &ConnectionSettings,
) -> Result<BTreeMap<String, String>, ChatApiError> {
    let mut headers = BTreeMap::new();
    let credential = connection.credential.trim();

    if connection.transport_mode.requires_credential() && credential.is_empty() {
        return Err(ChatApiError::MissingCredential);
    }
    if !credential.is_empty() {
        headers.insert(
            HEADER_AUTHORIZATION.to_owned(),
            format!("Bearer {credential}"),
        );
    }

    let accept = match connection.transport_mode {
        TransportMode::Client => "text/event-stream",
        TransportMode::Server => "text/plain, text/event-stream",
    };
    headers.insert(HEADER_ACCEPT.to_owned(), accept.to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    let ua = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

fn default_user_agent() -> String {
    format!(
        "subtitle-studio/{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        normalize_arch(std::env::consts::ARCH)
    )
}

fn normalize_arch(arch: &str) -> String {
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" => "x64".to_owned(),
        "x86" | "i386" | "i686" => "ia32".to_owned(),
        "aarch64" => "arm64".to_owned(),
        normalized => normalized.to_owned(),
    }
}
