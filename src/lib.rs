//! notify-hub: change notifications for streaming subscribers
//!
//! A central [`Hub`] fans change events out to every live subscriber
//! connection. Writers publish through a cloneable [`HubHandle`]; readers
//! hold long-lived connections that the hub registers, writes to, and drops
//! when a write fails.
//!
//! # Modules
//!
//! - [`hub`]: registry, router and dispatch workers
//! - [`session`]: framed stream subscribers and their lifecycle
//! - [`server`]: TCP accept loop feeding subscribers into the hub
//! - [`feed`]: in-memory item store that publishes inserts
//!
//! # Example
//! ```no_run
//! use notify_hub::feed::{ItemStore, NewItem};
//! use notify_hub::{NotifyServer, ServerConfig};
//!
//! # async fn example() -> notify_hub::error::Result<()> {
//! let server = NotifyServer::bind(ServerConfig::default()).await?;
//! let store = ItemStore::seeded(server.handle());
//! tokio::spawn(server.run());
//!
//! store.insert(NewItem::new("Eggs", 12)).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod feed;
pub mod hub;
pub mod server;
pub mod session;

pub use error::{Error, Result};
pub use hub::{ChangeEvent, Connection, Hub, HubConfig, HubHandle};
pub use server::{NotifyServer, ServerConfig};
