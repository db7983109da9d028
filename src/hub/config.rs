//! Hub configuration

/// Queue capacities for the hub's three inbound channels
///
/// Senders wait when a queue is full. Registration is rare compared to
/// broadcasts, so its queue is the smallest.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Capacity of the register queue
    pub register_capacity: usize,

    /// Capacity of the unregister queue (shared by lifecycle handlers and
    /// failing dispatch workers)
    pub unregister_capacity: usize,

    /// Capacity of the broadcast queue
    pub broadcast_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            register_capacity: 64,
            unregister_capacity: 256,
            broadcast_capacity: 1024,
        }
    }
}

impl HubConfig {
    /// Set the register queue capacity
    pub fn register_capacity(mut self, capacity: usize) -> Self {
        self.register_capacity = capacity.max(1);
        self
    }

    /// Set the unregister queue capacity
    pub fn unregister_capacity(mut self, capacity: usize) -> Self {
        self.unregister_capacity = capacity.max(1);
        self
    }

    /// Set the broadcast queue capacity
    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity.max(1);
        self
    }
}
