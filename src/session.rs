//! One generation attempt end to end.
//!
//! `idle -> validating -> running -> {completed | cancelled | failed} -> idle`
//!
//! Starting a session revokes whichever session was live before it. A session
//! whose token is revoked stops delivering fragments at the next check and
//! ends as [`SessionOutcome::Cancelled`] without reporting errors or touching
//! history.

use std::sync::{Arc, Mutex, MutexGuard};

use generation_provider::{
    CancelToken, CancellationCoordinator, GenerationRequest, SessionId, Transport,
};
use studio_store::{HistoryLog, HistoryRecord, HistoryStore};

use crate::error::{ConfigurationError, GenerationError};
use crate::stream::{consume_stream, decoder_for};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Fragment {
        session: SessionId,
        text: String,
    },
    /// Emitted at most once per session, only while it is still live.
    Failed {
        session: SessionId,
        error: GenerationError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// A newer session began.
    Superseded,
    /// Stopped explicitly.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Committed(HistoryRecord),
    /// The stream ended normally without producing text.
    CompletedEmpty,
    Cancelled(CancelReason),
    Failed(GenerationError),
}

pub struct SessionController {
    coordinator: CancellationCoordinator,
    transport: Arc<dyn Transport>,
    history: Mutex<HistoryStore>,
}

impl SessionController {
    pub fn new(transport: Arc<dyn Transport>, history: HistoryStore) -> Self {
        Self {
            coordinator: CancellationCoordinator::new(),
            transport,
            history: Mutex::new(history),
        }
    }

    #[must_use]
    pub fn coordinator(&self) -> &CancellationCoordinator {
        &self.coordinator
    }

    /// Session currently authorized to deliver output.
    #[must_use]
    pub fn running_session(&self) -> Option<SessionId> {
        self.coordinator.live_session()
    }

    /// Revoke the live session without starting a new one.
    pub fn stop(&self) -> Option<SessionId> {
        let stopped = self.coordinator.cancel_live();
        if let Some(session) = stopped {
            tracing::debug!(session, "generation session stopped");
        }
        stopped
    }

    #[must_use]
    pub fn history_log(&self) -> HistoryLog {
        lock_unpoisoned(&self.history).log().clone()
    }

    pub fn with_history<R>(&self, f: impl FnOnce(&mut HistoryStore) -> R) -> R {
        f(&mut lock_unpoisoned(&self.history))
    }

    /// Run one session, forwarding fragments to `sink` as they arrive.
    pub async fn generate(
        &self,
        request: GenerationRequest,
        sink: &mut (dyn FnMut(SessionEvent) + Send),
    ) -> SessionOutcome {
        if let Err(error) = validate(&request) {
            tracing::warn!(%error, "generation request rejected");
            return SessionOutcome::Failed(error.into());
        }

        let token = self.coordinator.begin_session();
        let session = token.session();
        tracing::debug!(
            session,
            model = %request.model,
            mode = request.connection.transport_mode.as_str(),
            "generation session started"
        );

        let mut accumulated = String::new();
        let result = self
            .run(&request, &token, &mut |text| {
                accumulated.push_str(text);
                sink(SessionEvent::Fragment {
                    session,
                    text: text.to_owned(),
                });
            })
            .await;

        if let Some(reason) = cancel_reason(&token) {
            tracing::debug!(session, ?reason, "generation session cancelled");
            return SessionOutcome::Cancelled(reason);
        }

        let outcome = match result {
            Ok(()) if accumulated.is_empty() => {
                tracing::info!(session, "generation completed without output");
                SessionOutcome::CompletedEmpty
            }
            Ok(()) => match self.commit(&request.text, accumulated) {
                Ok(record) => {
                    tracing::info!(session, record = record.id, "generation committed");
                    SessionOutcome::Committed(record)
                }
                Err(error) => self.fail(session, sink, error),
            },
            Err(error) => self.fail(session, sink, error),
        };

        self.coordinator.cancel(&token);
        outcome
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        token: &CancelToken,
        deliver: &mut (dyn FnMut(&str) + Send),
    ) -> Result<(), GenerationError> {
        let handle = self.transport.send(request, token).await?;
        let mut decoder = decoder_for(handle.framing);
        consume_stream(handle.chunks, decoder.as_mut(), token, deliver).await
    }

    fn commit(&self, input: &str, output: String) -> Result<HistoryRecord, GenerationError> {
        let mut history = lock_unpoisoned(&self.history);
        Ok(history.record(input, output)?)
    }

    fn fail(
        &self,
        session: SessionId,
        sink: &mut (dyn FnMut(SessionEvent) + Send),
        error: GenerationError,
    ) -> SessionOutcome {
        tracing::warn!(session, %error, "generation session failed");
        sink(SessionEvent::Failed {
            session,
            error: error.clone(),
        });
        SessionOutcome::Failed(error)
    }
}

fn validate(request: &GenerationRequest) -> Result<(), ConfigurationError> {
    if request.text.trim().is_empty() {
        return Err(ConfigurationError::EmptyText);
    }
    if request.model.trim().is_empty() {
        return Err(ConfigurationError::MissingModel);
    }

    let connection = &request.connection;
    if connection.transport_mode.requires_credential() && connection.credential.trim().is_empty()
    {
        return Err(ConfigurationError::MissingCredential);
    }
    if connection.endpoint.trim().is_empty() {
        return Err(ConfigurationError::MissingEndpoint);
    }

    Ok(())
}

fn cancel_reason(token: &CancelToken) -> Option<CancelReason> {
    if token.is_live() {
        None
    } else if token.is_superseded() {
        Some(CancelReason::Superseded)
    } else {
        Some(CancelReason::Stopped)
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
