//! Item feed
//!
//! A small in-memory data store that publishes the newest item to the hub
//! whenever one is inserted.

pub mod item;
pub mod store;

pub use item::{Item, NewItem};
pub use store::{ItemStore, MAX_NAME_LEN, SEED_ITEMS};
