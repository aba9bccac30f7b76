use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::SearchBackend;
use crate::error::ClientError;

/// Connected backends keyed by cluster name.
///
/// The registry only hands out shared handles; readers never take
/// ownership of a backend.
pub struct BackendRegistry<B: SearchBackend> {
    backends: HashMap<String, Arc<B>>,
}

impl<B: SearchBackend> BackendRegistry<B> {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Register `backend` under `cluster`, replacing any earlier handle.
    pub fn register(&mut self, cluster: impl Into<String>, backend: B) -> Arc<B> {
        let backend = Arc::new(backend);
        self.backends.insert(cluster.into(), Arc::clone(&backend));
        backend
    }

    pub fn get(&self, cluster: &str) -> Result<Arc<B>, ClientError> {
        self.backends
            .get(cluster)
            .cloned()
            .ok_or_else(|| ClientError::UnknownCluster(cluster.to_string()))
    }

    pub fn clusters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<B: SearchBackend> Default for BackendRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}
