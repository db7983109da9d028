//! Notification server
//!
//! Accepts TCP subscribers and streams hub events to them as
//! length-prefixed frames.

pub mod config;
pub mod listener;

pub use config::ServerConfig;
pub use listener::NotifyServer;
