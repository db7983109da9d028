//! Connection registry
//!
//! Plain `HashMap` with no locking: it is owned by the router task and
//! never shared.

use std::collections::HashMap;
use std::sync::Arc;

use super::connection::ConnKey;
use super::record::SubscriberRecord;

/// A registered connection and its record
pub(crate) struct RegistryEntry<C> {
    pub conn: Arc<C>,
    pub record: Arc<SubscriberRecord>,
}

/// Set of live subscriber connections
pub(crate) struct Registry<C> {
    entries: HashMap<ConnKey, RegistryEntry<C>>,
}

impl<C> Registry<C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert a fresh record for `conn`
    ///
    /// Registering the same connection twice replaces its record.
    pub(crate) fn add(&mut self, conn: Arc<C>) -> ConnKey {
        let key = ConnKey::of(&conn);
        self.entries.insert(
            key,
            RegistryEntry {
                conn,
                record: Arc::new(SubscriberRecord::new()),
            },
        );
        key
    }

    /// Remove `conn`, returning its entry if it was present
    pub(crate) fn remove(&mut self, conn: &Arc<C>) -> Option<RegistryEntry<C>> {
        self.entries.remove(&ConnKey::of(conn))
    }

    /// Visit every registered connection
    pub(crate) fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<C>, &Arc<SubscriberRecord>),
    {
        for entry in self.entries.values() {
            f(&entry.conn, &entry.record);
        }
    }

    pub(crate) fn contains(&self, conn: &Arc<C>) -> bool {
        self.entries.contains_key(&ConnKey::of(conn))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
