use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::ports::RemoteStore;

/// Decoded data found at one candidate path.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteHit<T> {
    pub path: String,
    pub data: T,
}

/// Probes an ordered list of remote paths and returns the first one holding
/// usable data. The last path that produced it is tried first on later polls.
pub struct RemotePathPoller {
    store: Arc<dyn RemoteStore>,
    candidates: Vec<String>,
    preferred: RwLock<Option<String>>,
}

impl RemotePathPoller {
    pub fn new(store: Arc<dyn RemoteStore>, candidates: Vec<String>) -> Self {
        Self {
            store,
            candidates,
            preferred: RwLock::new(None),
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub async fn preferred(&self) -> Option<String> {
        self.preferred.read().await.clone()
    }

    /// Probe order for this cycle: the preferred path, then every other
    /// candidate in configured order.
    async fn probe_order(&self, use_preference: bool) -> Vec<String> {
        let preferred = if use_preference {
            self.preferred.read().await.clone()
        } else {
            None
        };

        match preferred {
            Some(p) => std::iter::once(p.clone())
                .chain(self.candidates.iter().filter(|c| **c != p).cloned())
                .collect(),
            None => self.candidates.clone(),
        }
    }

    /// Errors, empty paths and paths `decode` rejects are logged and
    /// skipped; `None` means no candidate held usable data this cycle. Only
    /// an accepted path becomes the preferred one.
    pub async fn fetch_first<T, F>(&self, use_preference: bool, decode: F) -> Option<RemoteHit<T>>
    where
        F: Fn(&str, &Value) -> Option<T> + Send + Sync,
        T: Send,
    {
        for path in self.probe_order(use_preference).await {
            match self.store.get(&path).await {
                Ok(Some(value)) if has_data(&value) => {
                    let Some(data) = decode(&path, &value) else {
                        debug!(path = %path, "Remote path held nothing usable");
                        continue;
                    };
                    let mut preferred = self.preferred.write().await;
                    if preferred.as_deref() != Some(path.as_str()) {
                        debug!(path = %path, "Preferring remote path");
                        *preferred = Some(path.clone());
                    }
                    return Some(RemoteHit { path, data });
                }
                Ok(_) => {
                    debug!(path = %path, "No data at remote path");
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Remote path fetch failed");
                }
            }
        }
        None
    }
}

fn has_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => items.iter().any(|v| !v.is_null()),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
