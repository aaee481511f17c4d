//! Fake collaborators shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use hangar_core::{GenerationClient, GenerationError, GenerationResponse, HangarError, PersistentStore};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

type Reply = Result<GenerationResponse, GenerationError>;

/// Answers every prompt with `<prompt>.glb`
#[derive(Default)]
pub struct EchoClient {
    pub calls: AtomicUsize,
}

impl EchoClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl GenerationClient for EchoClient {
    async fn submit(&self, prompt: &str) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GenerationResponse::new(format!("{}.glb", prompt)))
    }
}

/// Replays canned replies in order
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn with(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn submit(&self, prompt: &str) -> Reply {
        self.prompts.lock().push(prompt.to_string());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Transport("script exhausted".into())))
    }
}

/// Holds each call open until the test releases its gate.
///
/// Every call reports its prompt on the `started` channel once it is in flight,
/// which lets a test order concurrent calls deterministically.
pub struct GatedClient {
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    started: mpsc::UnboundedSender<String>,
}

impl GatedClient {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (started, started_rx) = mpsc::unbounded_channel();
        let client = Arc::new(Self {
            gates: Mutex::new(HashMap::new()),
            started,
        });
        (client, started_rx)
    }

    /// Register a gate for `prompt`; sending on it resolves the call
    pub fn gate(&self, prompt: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(prompt.to_string(), rx);
        tx
    }
}

#[async_trait]
impl GenerationClient for GatedClient {
    async fn submit(&self, prompt: &str) -> Reply {
        let gate = self.gates.lock().remove(prompt);
        let _ = self.started.send(prompt.to_string());
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(GenerationError::Transport("gate dropped".into()))),
            None => Err(GenerationError::Transport(format!("no gate for {}", prompt))),
        }
    }
}

/// A store that is always unavailable
#[derive(Default)]
pub struct BrokenStore {
    pub writes: AtomicUsize,
}

#[async_trait]
impl PersistentStore for BrokenStore {
    async fn get(&self, _key: &str) -> hangar_core::Result<Option<String>> {
        Err(HangarError::Store("storage disabled".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> hangar_core::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(HangarError::Store("quota exceeded".into()))
    }
}
