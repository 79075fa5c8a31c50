//! Synthetic payload for the streaming server mode.
//!
//! The payload is 600 repetitions of a fixed 113-byte log line, 67800
//! bytes total. That is deliberately larger than 65536 bytes so a single
//! transport write cannot cover it and the response writer's write-in-full
//! contract is actually exercised.

use bytes::{BufMut, Bytes, BytesMut};

const LINE_PREFIX: &[u8] = b"log message ";
const LINE_FILL: usize = 100;
const LINE_COUNT: usize = 600;

/// Length of one payload line, including the trailing newline.
pub const LINE_LEN: usize = LINE_PREFIX.len() + LINE_FILL + 1;

/// Total payload length.
pub const PAYLOAD_LEN: usize = LINE_LEN * LINE_COUNT;

/// Build the synthetic payload.
pub fn synthetic_log() -> Bytes {
    let mut buf = BytesMut::with_capacity(PAYLOAD_LEN);
    for _ in 0..LINE_COUNT {
        buf.put_slice(LINE_PREFIX);
        buf.put_bytes(b'.', LINE_FILL);
        buf.put_u8(b'\n');
    }
    buf.freeze()
}
