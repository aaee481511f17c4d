//! Generation-and-history manager
//!
//! Owns the live state (history, selection, request state) and is the only writer of
//! the persisted history. Every mutation runs under one lock, including its store
//! write, and a fresh [`ManagerSnapshot`] is published once the step is complete, so
//! readers never observe a half-applied change.
//!
//! Concurrent `generate` calls are ordered by a generation token taken at issue time.
//! Only the call holding the latest token may commit; older calls are left to finish
//! and their results are dropped.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::client::{GenerationClient, GenerationResponse};
use crate::codec;
use crate::error::{GenerationError, PersistenceWarning};
use crate::model::{GeneratedModel, History, ModelId};
use crate::store::{PersistentStore, HISTORY_KEY};

/// State of the most recent generation request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(GenerationError),
}

/// What happened to a `generate` call that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// The result was merged into history and selected
    Committed(GeneratedModel),
    /// A newer call was issued before this one resolved; its result was dropped
    Superseded,
}

/// Consistent read-only view for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerSnapshot {
    pub history: History,
    pub selected_model: Option<GeneratedModel>,
    pub request_state: RequestState,
    pub is_generating: bool,
    pub error: Option<GenerationError>,
    /// True only while the first read of the persisted history is in flight
    pub is_history_loading: bool,
}

#[derive(Debug, Default)]
struct ManagerState {
    history: History,
    selection: Option<ModelId>,
    request_state: RequestState,
    current_token: u64,
    loaded: bool,
    loading: bool,
}

impl ManagerState {
    /// Explicit selection if it still exists, otherwise the newest record
    fn selected_model(&self) -> Option<&GeneratedModel> {
        self.selection
            .as_ref()
            .and_then(|id| self.history.get(id))
            .or_else(|| self.history.head())
    }

    fn snapshot(&self) -> ManagerSnapshot {
        let error = match &self.request_state {
            RequestState::Failed(err) => Some(err.clone()),
            _ => None,
        };
        ManagerSnapshot {
            history: self.history.clone(),
            selected_model: self.selected_model().cloned(),
            request_state: self.request_state.clone(),
            is_generating: self.request_state == RequestState::Pending,
            error,
            is_history_loading: self.loading,
        }
    }
}

/// Coordinates generation requests and the persisted history
pub struct GenerationManager {
    store: Arc<dyn PersistentStore>,
    client: Arc<dyn GenerationClient>,
    state: Mutex<ManagerState>,
    snapshot_tx: watch::Sender<ManagerSnapshot>,
}

impl GenerationManager {
    /// Create a manager without touching the store. History reads as empty until
    /// [`load_history`](Self::load_history) runs or the first commit happens.
    pub fn new(store: Arc<dyn PersistentStore>, client: Arc<dyn GenerationClient>) -> Self {
        let state = ManagerState::default();
        let (snapshot_tx, _) = watch::channel(state.snapshot());
        Self {
            store,
            client,
            state: Mutex::new(state),
            snapshot_tx,
        }
    }

    /// Create a manager and read the persisted history
    pub async fn open(store: Arc<dyn PersistentStore>, client: Arc<dyn GenerationClient>) -> Self {
        let manager = Self::new(store, client);
        manager.load_history().await;
        manager
    }

    /// Perform the initial store read. Only the first call does anything.
    pub async fn load_history(&self) {
        let mut state = self.state.lock().await;
        if state.loaded {
            return;
        }
        self.ensure_loaded(&mut state).await;
        self.publish(&state);
    }

    /// Run one generation.
    ///
    /// Returns `Err(EmptyPrompt)` for a blank prompt without contacting the client.
    /// A call that is overtaken by a newer one returns `Ok(Superseded)` and changes nothing.
    pub async fn generate(&self, prompt: &str) -> Result<GenerateOutcome, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let token = {
            let mut state = self.state.lock().await;
            state.current_token += 1;
            state.request_state = RequestState::Pending;
            self.publish(&state);
            state.current_token
        };

        tracing::debug!("Generation #{} submitted: {:?}", token, prompt);
        let result = self.client.submit(prompt).await.and_then(usable_response);

        let mut state = self.state.lock().await;
        if token != state.current_token {
            tracing::debug!(
                "Generation #{} superseded by #{}, result dropped",
                token,
                state.current_token
            );
            return Ok(GenerateOutcome::Superseded);
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::info!("Generation #{} failed: {}", token, err);
                state.request_state = RequestState::Failed(err.clone());
                self.publish(&state);
                return Err(err);
            }
        };

        self.ensure_loaded(&mut state).await;

        let now = Utc::now();
        let created_at = match state.history.head() {
            Some(head) if head.created_at > now => head.created_at,
            _ => now,
        };
        let model = GeneratedModel {
            id: ModelId::new(),
            prompt: prompt.to_string(),
            url: response.url,
            thumbnail_url: response.thumbnail_url,
            metadata: response.metadata,
            created_at,
        };

        if let Some(evicted) = state.history.prepend(model.clone()) {
            tracing::debug!("History full, evicted {}", evicted.id);
        }
        state.selection = Some(model.id);
        state.request_state = RequestState::Succeeded;
        self.persist(&state.history).await;
        self.publish(&state);

        tracing::info!("Model generated: {} -> {}", model.id, model.url);
        Ok(GenerateOutcome::Committed(model))
    }

    /// Select a record for display. Dangling ids are allowed; reads fall back to the head.
    pub async fn select_model(&self, id: ModelId) {
        let mut state = self.state.lock().await;
        state.selection = Some(id);
        self.publish(&state);
    }

    /// Drop every record, persist the empty history and clear the selection
    pub async fn clear_history(&self) {
        let mut state = self.state.lock().await;
        // Nothing left to load: the empty history is now authoritative
        state.loaded = true;
        state.history.clear();
        state.selection = None;
        self.persist(&state.history).await;
        self.publish(&state);
        tracing::info!("History cleared");
    }

    /// Return from `Failed` to `Idle`. Other states are left alone.
    pub async fn reset_error(&self) {
        let mut state = self.state.lock().await;
        if matches!(state.request_state, RequestState::Failed(_)) {
            state.request_state = RequestState::Idle;
            self.publish(&state);
        }
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> ManagerSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Receive a new snapshot after every completed mutation
    pub fn subscribe(&self) -> watch::Receiver<ManagerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn history(&self) -> History {
        self.snapshot_tx.borrow().history.clone()
    }

    pub fn selected_model(&self) -> Option<GeneratedModel> {
        self.snapshot_tx.borrow().selected_model.clone()
    }

    pub fn request_state(&self) -> RequestState {
        self.snapshot_tx.borrow().request_state.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.snapshot_tx.borrow().is_generating
    }

    pub fn error(&self) -> Option<GenerationError> {
        self.snapshot_tx.borrow().error.clone()
    }

    pub fn is_history_loading(&self) -> bool {
        self.snapshot_tx.borrow().is_history_loading
    }

    async fn ensure_loaded(&self, state: &mut ManagerState) {
        if state.loaded {
            return;
        }

        state.loading = true;
        self.publish(state);
        let raw = match self.store.get(HISTORY_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn(PersistenceWarning::Read(e.to_string()));
                None
            }
        };
        state.loading = false;

        let decoded = codec::decode(raw.as_deref());
        if let Some(warning) = decoded.warning {
            warn(warning);
        }

        tracing::debug!("Loaded {} history records", decoded.history.len());
        state.history = decoded.history;
        state.loaded = true;
    }

    async fn persist(&self, history: &History) {
        if let Err(e) = self.store.set(HISTORY_KEY, &codec::encode(history)).await {
            warn(PersistenceWarning::Write(e.to_string()));
        }
    }

    fn publish(&self, state: &ManagerState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }
}

fn usable_response(response: GenerationResponse) -> Result<GenerationResponse, GenerationError> {
    if response.url.trim().is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(response)
    }
}

fn warn(warning: PersistenceWarning) {
    tracing::warn!("{}", warning);
}
