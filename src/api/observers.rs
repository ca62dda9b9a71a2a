//! Registry of connected observer sockets.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// What is known about one connected observer.
#[derive(Debug, Clone)]
pub struct ObserverInfo {
    pub connected_at: DateTime<Utc>,
}

/// Connected observers, keyed by a per-connection id.
#[derive(Debug, Clone, Default)]
pub struct ObserverRegistry {
    observers: Arc<DashMap<Uuid, ObserverInfo>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer. It stays registered until the guard drops.
    pub fn register(&self) -> ObserverGuard {
        let id = Uuid::new_v4();
        self.observers.insert(
            id,
            ObserverInfo {
                connected_at: Utc::now(),
            },
        );
        ObserverGuard {
            observers: Arc::clone(&self.observers),
            id,
        }
    }

    /// Number of currently connected observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<ObserverInfo> {
        self.observers.get(id).map(|entry| entry.value().clone())
    }
}

/// RAII guard that removes an observer from the registry on drop.
///
/// Covers every exit path of the socket task: close, send error, panic.
#[derive(Debug)]
pub struct ObserverGuard {
    observers: Arc<DashMap<Uuid, ObserverInfo>>,
    id: Uuid,
}

impl ObserverGuard {
    pub const fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        self.observers.remove(&self.id);
    }
}
