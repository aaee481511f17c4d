//! Hangar Core - Generation and history manager for prompt-to-3D-model workflows
//!
//! A user describes a part in natural language, a remote generation service turns the
//! description into a 3D model reference, and Hangar keeps the results as a small,
//! locally persisted history.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              Presentation (CLI, viewer, ...)             │
//! └────────────┬──────────────────────────────▲──────────────┘
//!              │ generate / select / clear    │ ManagerSnapshot
//!   ┌──────────▼──────────────────────────────┴──────────┐
//!   │                 GenerationManager                   │
//!   │   history · selection · request state · token      │
//!   └──────┬───────────────────────────────────┬─────────┘
//!          │                                   │
//!   ┌──────▼─────────┐                 ┌───────▼────────┐
//!   │GenerationClient│                 │  codec (JSON)  │
//!   │  (HTTP, fakes) │                 └───────┬────────┘
//!   └────────────────┘                 ┌───────▼────────┐
//!                                      │PersistentStore │
//!                                      │ (file, memory) │
//!                                      └────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use hangar_core::{GenerationManager, HangarConfig, HttpGenerationClient, MemoryStore};
//!
//! # async fn run() -> hangar_core::Result<()> {
//! let config = HangarConfig::from_env()?;
//! let client = Arc::new(HttpGenerationClient::from_settings(&config.generator)?);
//! let manager = GenerationManager::open(Arc::new(MemoryStore::new()), client).await;
//!
//! if manager.generate("biplane wing").await.is_ok() {
//!     println!("{:?}", manager.selected_model());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod store;

pub use client::{GenerationClient, GenerationResponse, HttpGenerationClient};
pub use codec::Decoded;
pub use config::{GeneratorSettings, HangarConfig, StorageSettings};
pub use error::{GenerationError, HangarError, PersistenceWarning, Result};
pub use manager::{GenerateOutcome, GenerationManager, ManagerSnapshot, RequestState};
pub use model::{GeneratedModel, History, ModelId, HISTORY_CAPACITY};
pub use store::{FileStore, MemoryStore, PersistentStore, HISTORY_KEY};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
