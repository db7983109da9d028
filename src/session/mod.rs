//! Subscriber sessions
//!
//! Concrete subscriber connections and the lifecycle that moves them in and
//! out of the hub.

pub mod frame;
pub mod lifecycle;
pub mod stream;

pub use frame::{decode_frame, encode_frame, CLOSE_FRAME, MAX_FRAME_SIZE};
pub use lifecycle::{serve_subscriber, serve_subscriber_with_buffer};
pub use stream::{StreamSubscriber, TcpSubscriber};
