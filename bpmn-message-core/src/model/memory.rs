//! In-memory instances, processes and tokens.
//!
//! Enough of the execution side for an embedding driver without its own
//! instance model, and for tests.

use super::{ExecutionInstance, Process, ThrowEvent, Token};
use crate::error::MappingError;
use crate::store::{DataStore, SharedDataStore};
use std::sync::{Arc, RwLock};

/// An instance that owns nothing but its data store.
#[derive(Debug)]
pub struct MemoryInstance {
    id: String,
    store: SharedDataStore,
}

impl MemoryInstance {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_store(id, DataStore::new())
    }

    pub fn with_store(id: impl Into<String>, store: DataStore) -> Self {
        Self {
            id: id.into(),
            store: store.into_shared(),
        }
    }
}

impl ExecutionInstance for MemoryInstance {
    fn id(&self) -> &str {
        &self.id
    }

    fn data_store(&self) -> SharedDataStore {
        Arc::clone(&self.store)
    }
}

/// A process holding the instances started against it.
#[derive(Debug)]
pub struct MemoryProcess {
    id: String,
    instances: RwLock<Vec<Arc<dyn ExecutionInstance>>>,
}

impl MemoryProcess {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            instances: RwLock::new(Vec::new()),
        }
    }

    /// Register an instance, tagging its store with this process as owner.
    pub fn start_instance(
        &self,
        instance: MemoryInstance,
    ) -> Result<Arc<dyn ExecutionInstance>, MappingError> {
        instance
            .store
            .write()
            .map_err(|_| MappingError::StoreUnavailable { store: "instance" })?
            .set_owner_process(self.id.clone());

        let instance: Arc<dyn ExecutionInstance> = Arc::new(instance);
        self.instances
            .write()
            .map_err(|_| MappingError::StoreUnavailable { store: "process" })?
            .push(Arc::clone(&instance));
        Ok(instance)
    }
}

impl Process for MemoryProcess {
    fn id(&self) -> &str {
        &self.id
    }

    fn instances(&self) -> Vec<Arc<dyn ExecutionInstance>> {
        self.instances
            .read()
            .map(|instances| instances.clone())
            .unwrap_or_default()
    }
}

/// A token sitting on a throw event, optionally bound to an instance.
pub struct MemoryToken {
    owner: Arc<dyn ThrowEvent>,
    instance: Option<Arc<dyn ExecutionInstance>>,
}

impl MemoryToken {
    pub fn new(owner: Arc<dyn ThrowEvent>) -> Self {
        Self {
            owner,
            instance: None,
        }
    }

    pub fn with_instance(mut self, instance: Arc<dyn ExecutionInstance>) -> Self {
        self.instance = Some(instance);
        self
    }
}

impl Token for MemoryToken {
    fn owner_element(&self) -> &dyn ThrowEvent {
        self.owner.as_ref()
    }

    fn instance(&self) -> Option<&dyn ExecutionInstance> {
        self.instance.as_deref()
    }
}
