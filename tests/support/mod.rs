#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::BoxFuture;
use futures_util::{stream, FutureExt};
use generation_provider::{
    CancelToken, ConnectionSettings, Framing, GenerationRequest, Language, StreamHandle,
    Transport, TransportFailure, TransportMode,
};
use studio_store::{HistoryStore, MemoryUnitStore};
use subtitle_studio::SessionController;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub type Chunk = Result<Vec<u8>, TransportFailure>;

pub enum Script {
    /// Respond immediately with a finite body.
    Body { framing: Framing, chunks: Vec<Chunk> },
    /// Respond immediately; chunks arrive when the test sends them.
    Channel {
        framing: Framing,
        receiver: UnboundedReceiver<Chunk>,
    },
    /// Fail before any chunk.
    Fail(TransportFailure),
}

impl Script {
    pub fn plain(parts: &[&str]) -> Self {
        Self::Body {
            framing: Framing::PlainText,
            chunks: parts.iter().map(|part| Ok(part.as_bytes().to_vec())).collect(),
        }
    }

    pub fn channel(framing: Framing) -> (Self, UnboundedSender<Chunk>) {
        let (sender, receiver) = unbounded_channel();
        (Self::Channel { framing, receiver }, sender)
    }
}

/// In-process transport that replays queued scripts in order.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedTransport {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, script: Script) {
        lock_unpoisoned(&self.scripts).push_back(script);
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock_unpoisoned(&self.requests).clone()
    }
}

impl Transport for ScriptedTransport {
    fn send<'a>(
        &'a self,
        request: &'a GenerationRequest,
        _token: &'a CancelToken,
    ) -> BoxFuture<'a, Result<StreamHandle, TransportFailure>> {
        lock_unpoisoned(&self.requests).push(request.clone());
        let script = lock_unpoisoned(&self.scripts).pop_front();

        async move {
            match script {
                Some(Script::Body { framing, chunks }) => {
                    Ok(StreamHandle::new(framing, stream::iter(chunks)))
                }
                Some(Script::Channel { framing, receiver }) => Ok(StreamHandle::new(
                    framing,
                    stream::unfold(receiver, |mut receiver| async move {
                        receiver.recv().await.map(|chunk| (chunk, receiver))
                    }),
                )),
                Some(Script::Fail(failure)) => Err(failure),
                None => Err(TransportFailure::connection("no scripted response left")),
            }
        }
        .boxed()
    }
}

pub fn connection(mode: TransportMode, credential: &str) -> ConnectionSettings {
    ConnectionSettings {
        credential: credential.to_owned(),
        endpoint: "https://api.example.com".to_owned(),
        transport_mode: mode,
    }
}

pub fn request(text: &str) -> GenerationRequest {
    GenerationRequest::new(
        text,
        Language::En,
        "m1",
        connection(TransportMode::Client, "sk-test"),
    )
}

pub fn controller(transport: Arc<ScriptedTransport>) -> (SessionController, MemoryUnitStore) {
    let units = MemoryUnitStore::new();
    let history = HistoryStore::open(Arc::new(units.clone()));
    (SessionController::new(transport, history), units)
}

/// Yield to sibling futures until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition was not reached");
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
