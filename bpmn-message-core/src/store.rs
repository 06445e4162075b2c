use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// A data store shared between its owning instance and whoever maps into it.
///
/// The lock only satisfies the borrow checker. Concurrent firings that target
/// the same store must still be serialized by the engine driving them.
pub type SharedDataStore = Arc<RwLock<DataStore>>;

/// Largest gap past the end of an index-container that `set_dot` pads with
/// nulls. Writing further out turns the container into a key-container.
const MAX_INDEX_GAP: usize = 1024;

// ─── DataStore ────────────────────────────────────────────────

/// Hierarchical key/value data owned by one process instance (or a transient
/// mapping buffer), addressed by dot paths such as `items.0.name`.
///
/// The root is always a key-container. Below it, a segment made only of
/// ASCII digits addresses an index-container slot and any other segment
/// addresses a key-container slot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataStore {
    id: Uuid,
    owner_process: Option<String>,
    item_subject: Option<String>,
    data: Map<String, Value>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            owner_process: None,
            item_subject: None,
            data: Map::new(),
        }
    }

    /// Build a store around existing root data.
    pub fn with_data(data: Map<String, Value>) -> Self {
        let mut store = Self::new();
        store.data = data;
        store
    }

    pub fn into_shared(self) -> SharedDataStore {
        Arc::new(RwLock::new(self))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_process(&self) -> Option<&str> {
        self.owner_process.as_deref()
    }

    pub fn set_owner_process(&mut self, process_id: impl Into<String>) -> &mut Self {
        self.owner_process = Some(process_id.into());
        self
    }

    pub fn item_subject(&self) -> Option<&str> {
        self.item_subject.as_deref()
    }

    pub fn set_item_subject(&mut self, item_subject: impl Into<String>) -> &mut Self {
        self.item_subject = Some(item_subject.into());
        self
    }

    // ── Top-level access ──

    /// The whole root container.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Read one top-level key. A key holding null is returned as null.
    pub fn get(&self, name: &str, default: Value) -> Value {
        self.data.get(name).cloned().unwrap_or(default)
    }

    /// Replace the entire root container.
    pub fn set_data(&mut self, data: Map<String, Value>) -> &mut Self {
        self.data = data;
        self
    }

    /// Set a single top-level key, leaving the others untouched.
    pub fn put(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.data.insert(name.into(), value);
        self
    }

    // ── Dot-path access ──

    /// Borrow the value at `path`, or `None` on any miss.
    pub fn lookup_dot(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.data, path)
    }

    /// Read the value at `path`, returning `default` the moment a segment is
    /// absent. An empty path always yields `default`.
    pub fn get_dot(&self, path: &str, default: Value) -> Value {
        self.lookup_dot(path).cloned().unwrap_or(default)
    }

    /// Write `value` at `path`, creating every missing intermediate container.
    ///
    /// An intermediate segment holding a scalar is replaced by a fresh
    /// container, so earlier data on that branch is lost. The kind of a new
    /// container follows the segment after it: digits give an index-container,
    /// anything else a key-container.
    pub fn set_dot(&mut self, path: &str, value: Value) -> &mut Self {
        let segments: Vec<&str> = path.split('.').collect();
        let mut root = Value::Object(std::mem::take(&mut self.data));

        let mut current = &mut root;
        for pair in segments.windows(2) {
            let child = slot_mut(current, pair[0]);
            if !child.is_object() && !child.is_array() {
                *child = empty_container_for(pair[1]);
            }
            current = child;
        }
        if let Some(last) = segments.last() {
            *slot_mut(current, last) = value;
        }

        if let Value::Object(map) = root {
            self.data = map;
        }
        self
    }

    /// SHA-256 of the canonical JSON rendering of the root.
    pub fn payload_hash(&self) -> [u8; 32] {
        let canonical = Value::Object(self.data.clone()).to_string();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hasher.finalize().into()
    }
}

// ─── Path helpers ─────────────────────────────────────────────

/// Walk `path` through `root`. Shared by the store and by path expressions
/// that read an evaluation context.
pub fn lookup_path<'v>(root: &'v Map<String, Value>, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return None;
    }
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = root.get(first)?;
    for raw in segments {
        current = match (current, parse_index(raw)) {
            (Value::Array(items), Some(index)) => items.get(index)?,
            (Value::Object(map), _) => map.get(raw)?,
            _ => return None,
        };
    }
    Some(current)
}

fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn empty_container_for(next: &str) -> Value {
    match parse_index(next) {
        Some(_) => Value::Array(Vec::new()),
        None => Value::Object(Map::new()),
    }
}

/// Mutable slot for `raw` inside `node`, created as null when missing.
fn slot_mut<'v>(node: &'v mut Value, raw: &str) -> &'v mut Value {
    let index = parse_index(raw);
    let fits = matches!(
        (&*node, index),
        (Value::Array(items), Some(i)) if i <= items.len() + MAX_INDEX_GAP
    );
    if !fits {
        promote_to_object(node);
    }

    match node {
        Value::Array(items) => {
            // `fits` only holds for a parsed index.
            let index = index.unwrap_or(items.len());
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        Value::Object(map) => map.entry(raw.to_string()).or_insert(Value::Null),
        other => {
            promote_to_object(other);
            slot_mut(other, raw)
        }
    }
}

/// Turn an index-container into a key-container keyed by its former indices.
/// Scalars become an empty key-container.
fn promote_to_object(node: &mut Value) {
    let map = match node {
        Value::Object(_) => return,
        Value::Array(items) => std::mem::take(items)
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        _ => Map::new(),
    };
    *node = Value::Object(map);
}
