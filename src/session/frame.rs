//! Subscriber wire framing
//!
//! ```text
//! +----------------+---------------------+
//! | length (u32 BE)| payload (length B)  |
//! +----------------+---------------------+
//! ```
//!
//! A frame with length 0 is the close frame: the server sends it before
//! shutting a subscriber down.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};

/// Size of the length prefix
pub const FRAME_HEADER_SIZE: usize = 4;

/// Largest payload accepted by [`encode_frame`] (16 MiB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Zero-length close frame
pub const CLOSE_FRAME: [u8; FRAME_HEADER_SIZE] = [0, 0, 0, 0];

/// Encode a payload as a length-prefixed frame
///
/// Empty payloads are rejected because they would read as a close frame.
pub fn encode_frame(payload: &[u8]) -> io::Result<Bytes> {
    if payload.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty payload is reserved for the close frame",
        ));
    }
    if payload.len() > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "payload of {} bytes exceeds frame limit of {}",
                payload.len(),
                MAX_FRAME_SIZE
            ),
        ));
    }

    let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Decode one frame from the front of `buf`
///
/// Returns `None` until a complete frame is buffered. A close frame decodes
/// to an empty `Bytes`.
pub fn decode_frame(buf: &mut BytesMut) -> Option<Bytes> {
    if buf.len() < FRAME_HEADER_SIZE {
        return None;
    }

    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    if buf.len() < FRAME_HEADER_SIZE + len {
        return None;
    }

    let mut frame = buf.split_to(FRAME_HEADER_SIZE + len);
    Some(frame.split_off(FRAME_HEADER_SIZE).freeze())
}
