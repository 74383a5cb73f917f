//! Mount bookkeeping.
//!
//! The record is shared: the composer writes it during startup and the admin
//! subsystem reads it at request time.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::services::id::ServiceId;

/// What a single mount attached to the server handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountEntry {
    pub service: ServiceId,
    pub prefixes: Vec<String>,
    pub background_tasks: usize,
}

/// Ordered log of mounted services. Each service appears at most once.
#[derive(Debug, Clone, Default)]
pub struct MountRecord {
    entries: Arc<RwLock<Vec<MountEntry>>>,
}

impl MountRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, service: ServiceId) -> bool {
        self.read().iter().any(|e| e.service == service)
    }

    /// Snapshot of every entry in mount order.
    pub fn entries(&self) -> Vec<MountEntry> {
        self.read().clone()
    }

    /// Mounted services in mount order.
    pub fn services(&self) -> Vec<ServiceId> {
        self.read().iter().map(|e| e.service).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Append an entry. Returns the entry back if the service is already recorded.
    pub(crate) fn insert(&self, entry: MountEntry) -> Result<(), MountEntry> {
        let mut entries = self.entries.write().expect("mount record lock poisoned");
        if entries.iter().any(|e| e.service == entry.service) {
            return Err(entry);
        }
        entries.push(entry);
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<MountEntry>> {
        self.entries.read().expect("mount record lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(service: ServiceId) -> MountEntry {
        MountEntry {
            service,
            prefixes: Vec::new(),
            background_tasks: 0,
        }
    }

    #[test]
    fn test_second_insert_is_rejected() {
        let record = MountRecord::new();
        assert!(record.insert(entry(ServiceId::Web)).is_ok());
        assert!(record.insert(entry(ServiceId::Web)).is_err());
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let record = MountRecord::new();
        let reader = record.clone();

        record.insert(entry(ServiceId::Worker)).unwrap();
        record.insert(entry(ServiceId::Web)).unwrap();

        assert_eq!(reader.services(), vec![ServiceId::Worker, ServiceId::Web]);
        assert!(reader.contains(ServiceId::Web));
        assert!(!reader.contains(ServiceId::Admin));
    }
}
