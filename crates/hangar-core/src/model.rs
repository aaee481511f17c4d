//! Generated model records and the bounded history that holds them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Maximum number of records kept in history
pub const HISTORY_CAPACITY: usize = 20;

/// Unique model record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub Uuid);

impl ModelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ModelId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One generation result. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedModel {
    /// Record ID, assigned by the manager
    pub id: ModelId,

    /// Trimmed prompt that produced this record
    pub prompt: String,

    /// Artifact reference (GLB/GLTF URL)
    pub url: String,

    /// Preview image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Service-defined extra data, opaque to Hangar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,

    /// Insertion timestamp
    pub created_at: DateTime<Utc>,
}

/// Newest-first list of generated models, capped at [`HISTORY_CAPACITY`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<GeneratedModel>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from foreign records, keeping the first occurrence of each id
    /// and dropping everything past capacity. Order is preserved.
    pub fn from_records(records: Vec<GeneratedModel>) -> Self {
        let mut kept: Vec<GeneratedModel> = Vec::with_capacity(HISTORY_CAPACITY);
        for record in records {
            if kept.len() == HISTORY_CAPACITY {
                break;
            }
            if !kept.iter().any(|m| m.id == record.id) {
                kept.push(record);
            }
        }
        Self(kept)
    }

    /// Insert a record at the head, evicting the oldest one when over capacity.
    ///
    /// A record whose id is already present replaces nothing; the stale copy is
    /// removed first so ids stay unique.
    pub fn prepend(&mut self, model: GeneratedModel) -> Option<GeneratedModel> {
        self.0.retain(|m| m.id != model.id);
        self.0.insert(0, model);
        if self.0.len() > HISTORY_CAPACITY {
            self.0.pop()
        } else {
            None
        }
    }

    /// Newest record
    pub fn head(&self) -> Option<&GeneratedModel> {
        self.0.first()
    }

    pub fn get(&self, id: &ModelId) -> Option<&GeneratedModel> {
        self.0.iter().find(|m| &m.id == id)
    }

    pub fn contains(&self, id: &ModelId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedModel> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[GeneratedModel] {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a GeneratedModel;
    type IntoIter = std::slice::Iter<'a, GeneratedModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
pub(crate) fn sample_model(prompt: &str, url: &str) -> GeneratedModel {
    GeneratedModel {
        id: ModelId::new(),
        prompt: prompt.to_string(),
        url: url.to_string(),
        thumbnail_url: None,
        metadata: None,
        created_at: Utc::now(),
    }
}
