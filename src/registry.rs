//! EngineRegistry - independent engines keyed by caller instance ID.
//!
//! Engines in a registry share nothing: each has its own pool, RNG,
//! configuration and metrics. The registry only hands out `Arc` handles.

use crate::engine::SpatialPoolingEngine;
use crate::{Result, SpatialPoolerConfig};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Map from instance ID to engine.
#[derive(Debug, Default)]
pub struct EngineRegistry {
    engines: RwLock<HashMap<String, Arc<SpatialPoolingEngine>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine registered under `id`.
    pub fn get(&self, id: &str) -> Option<Arc<SpatialPoolingEngine>> {
        self.engines.read().get(id).cloned()
    }

    /// Engine registered under `id`, creating it from `config` if absent.
    ///
    /// `config` is only validated when a new engine is built.
    pub fn get_or_create(
        &self,
        id: &str,
        config: &SpatialPoolerConfig,
    ) -> Result<Arc<SpatialPoolingEngine>> {
        if let Some(engine) = self.get(id) {
            return Ok(engine);
        }

        let mut engines = self.engines.write();
        // Another caller may have created it between the two locks
        if let Some(engine) = engines.get(id) {
            return Ok(Arc::clone(engine));
        }

        let engine = Arc::new(SpatialPoolingEngine::new(config.clone())?);
        engines.insert(id.to_string(), Arc::clone(&engine));
        info!(target: "sparsepool", instance = id, "Registered spatial pooler");
        Ok(engine)
    }

    /// Register `engine` under `id`, returning the one it replaces.
    pub fn insert(
        &self,
        id: impl Into<String>,
        engine: SpatialPoolingEngine,
    ) -> Option<Arc<SpatialPoolingEngine>> {
        let id = id.into();
        debug!(target: "sparsepool", instance = %id, "Inserting spatial pooler");
        self.engines.write().insert(id, Arc::new(engine))
    }

    pub fn remove(&self, id: &str) -> Option<Arc<SpatialPoolingEngine>> {
        let removed = self.engines.write().remove(id);
        if removed.is_some() {
            info!(target: "sparsepool", instance = id, "Removed spatial pooler");
        }
        removed
    }

    /// Registered IDs, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.engines.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.engines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.read().is_empty()
    }
}
