//! In-memory item store
//!
//! Every successful insert publishes the inserted item, serialized as JSON,
//! to the hub. Readers never publish.

use tokio::sync::RwLock;

use crate::error::{FeedError, Result};
use crate::hub::{ChangeEvent, HubHandle};

use super::item::{Item, NewItem};

/// Longest accepted item name, in characters
pub const MAX_NAME_LEN: usize = 255;

/// Items inserted by [`ItemStore::seeded`]
pub const SEED_ITEMS: [(&str, i32); 4] = [("Cheese", 5), ("Milk", 10), ("Bread", 15), ("Lamb", 20)];

struct Items {
    rows: Vec<Item>,
    next_id: u64,
}

/// Item store acting as the hub's notification source
pub struct ItemStore<C> {
    items: RwLock<Items>,
    hub: HubHandle<C>,
}

impl<C> ItemStore<C> {
    /// Create an empty store publishing to `hub`
    pub fn new(hub: HubHandle<C>) -> Self {
        Self {
            items: RwLock::new(Items {
                rows: Vec::new(),
                next_id: 1,
            }),
            hub,
        }
    }

    /// Create a store pre-populated with [`SEED_ITEMS`]
    ///
    /// Seeding does not publish.
    pub fn seeded(hub: HubHandle<C>) -> Self {
        let rows: Vec<Item> = SEED_ITEMS
            .iter()
            .zip(1u64..)
            .map(|(&(name, quantity), id)| Item {
                id,
                name: name.to_string(),
                quantity,
            })
            .collect();
        let next_id = rows.len() as u64 + 1;

        Self {
            items: RwLock::new(Items { rows, next_id }),
            hub,
        }
    }

    /// Insert an item and publish it
    ///
    /// The item is stored even if publishing fails; the error is returned so
    /// the caller can log it.
    pub async fn insert(&self, new: NewItem) -> Result<Item> {
        let name = validate_name(&new.name)?;

        let item = {
            let mut items = self.items.write().await;
            let item = Item {
                id: items.next_id,
                name,
                quantity: new.quantity,
            };
            items.next_id += 1;
            items.rows.push(item.clone());
            item
        };

        tracing::debug!(id = item.id, name = %item.name, "Item inserted");

        let event = ChangeEvent::json(&item)?;
        self.hub.broadcast(event).await?;

        Ok(item)
    }

    /// Look up an item by id
    pub async fn get(&self, id: u64) -> Option<Item> {
        let items = self.items.read().await;
        items.rows.iter().find(|item| item.id == id).cloned()
    }

    /// Most recently inserted item
    pub async fn latest(&self) -> Option<Item> {
        self.items.read().await.rows.last().cloned()
    }

    /// Up to `limit` items, newest first
    pub async fn recent(&self, limit: usize) -> Vec<Item> {
        let items = self.items.read().await;
        items.rows.iter().rev().take(limit).cloned().collect()
    }

    /// Number of stored items
    pub async fn len(&self) -> usize {
        self.items.read().await.rows.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.rows.is_empty()
    }
}

fn validate_name(name: &str) -> std::result::Result<String, FeedError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FeedError::EmptyName);
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(FeedError::NameTooLong {
            len,
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}
