use std::future::Future;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt};
use generation_provider::{
    CancelToken, Framing, GenerationRequest, StreamHandle, Transport, TransportFailure,
    TransportMode,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::headers::build_headers;
use crate::payload::{ChatCompletionRequest, RelayGenerateRequest};
use crate::retry::{backoff, is_transient};
use crate::url::endpoint_url;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn build_headers(&self, request: &GenerationRequest) -> Result<HeaderMap, ChatApiError> {
        let headers = build_headers(&self.config, &request.connection)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    ChatApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<reqwest::RequestBuilder, ChatApiError> {
        let mode = request.connection.transport_mode;
        let url = endpoint_url(&request.connection.endpoint, mode)?;
        let headers = self.build_headers(request)?;
        let builder = self.http.post(url).headers(headers);

        Ok(match mode {
            TransportMode::Client => builder.json(&ChatCompletionRequest::for_generation(request)),
            TransportMode::Server => builder.json(&RelayGenerateRequest::for_generation(request)),
        })
    }

    /// Dispatch the request and wait for a success status.
    ///
    /// Transient failures are retried up to `config.max_retries` times; no
    /// retry happens once a success response is returned.
    pub async fn send_with_retry(
        &self,
        request: &GenerationRequest,
        token: Option<&CancelToken>,
    ) -> Result<Response, ChatApiError> {
        let max_retries = self.config.max_retries;
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            if is_cancelled(token) {
                return Err(ChatApiError::Cancelled);
            }

            tracing::debug!(
                attempt,
                model = %request.model,
                mode = request.connection.transport_mode.as_str(),
                "dispatching generation request"
            );
            let response = self.build_request(request)?.send();
            let response = await_or_cancel(response, token).await?;

            match response {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }

                    let status = response.status();
                    last_status = Some(status);
                    let body = await_or_cancel(response.text(), token)
                        .await?
                        .unwrap_or_default();
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    if attempt < max_retries && is_transient(status, &body) {
                        tracing::warn!(attempt, %status, "retrying generation request");
                        await_or_cancel(tokio::time::sleep(backoff(attempt)), token)
                            .await?;
                        continue;
                    }

                    return Err(ChatApiError::Status(status, message));
                }
                Err(error) => {
                    if max_retries == 0 {
                        return Err(ChatApiError::Request(error));
                    }

                    last_error = Some(error.to_string());
                    if attempt < max_retries {
                        tracing::warn!(attempt, %error, "retrying generation request");
                        await_or_cancel(tokio::time::sleep(backoff(attempt)), token)
                            .await?;
                        continue;
                    }
                }
            }
        }

        Err(ChatApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Dispatch the request and hand back the raw body as a chunk stream.
    pub async fn open_stream(
        &self,
        request: &GenerationRequest,
        token: Option<&CancelToken>,
    ) -> Result<StreamHandle, ChatApiError> {
        let response = self.send_with_retry(request, token).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        let framing = framing_for(request.connection.transport_mode, content_type);
        tracing::debug!(?framing, content_type, "generation stream opened");
        let chunks = response.bytes_stream().map(|chunk| {
            chunk.map(|bytes| bytes.to_vec()).map_err(|error| {
                TransportFailure::connection(format!("stream read failed: {error}"))
            })
        });

        Ok(StreamHandle::new(framing, chunks))
    }
}

impl Transport for ChatApiClient {
    fn send<'a>(
        &'a self,
        request: &'a GenerationRequest,
        token: &'a CancelToken,
    ) -> BoxFuture<'a, Result<StreamHandle, TransportFailure>> {
        async move {
            self.open_stream(request, Some(token))
                .await
                .map_err(TransportFailure::from)
        }
        .boxed()
    }
}

/// Body framing for a successful response.
///
/// Chat-completion endpoints always stream SSE. A relay either streams raw
/// text or forwards the upstream event stream, which it marks with
/// `text/event-stream`.
#[must_use]
pub fn framing_for(mode: TransportMode, content_type: Option<&str>) -> Framing {
    match mode {
        TransportMode::Client => Framing::ChatCompletionSse,
        TransportMode::Server if content_type.is_some_and(is_event_stream) => {
            Framing::ChatCompletionSse
        }
        TransportMode::Server => Framing::PlainText,
    }
}

fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case("text/event-stream"))
}

fn is_cancelled(token: Option<&CancelToken>) -> bool {
    token.is_some_and(CancelToken::is_revoked)
}

async fn await_or_cancel<F>(
    future: F,
    token: Option<&CancelToken>,
) -> Result<F::Output, ChatApiError>
where
    F: Future,
{
    if token.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(token) {
            return Err(ChatApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(token) {
                return Err(ChatApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
