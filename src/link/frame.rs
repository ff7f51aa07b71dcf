//! Byte framing for the serial link.
//!
//! A frame is `COBS(payload ++ crc32_le(payload)) ++ 0x00`. The zero byte can
//! only appear as a delimiter, so a receiver that starts mid-stream resyncs at
//! the next one.

use crate::error::FrameError;
use bytes::BytesMut;
use tracing::warn;

pub const FRAME_DELIMITER: u8 = 0x00;
const CRC_LEN: usize = 4;
const DEFAULT_MAX_FRAME: usize = 64 * 1024;

pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(payload.len() + CRC_LEN);
    body.extend_from_slice(payload);
    body.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());

    let mut framed = cobs::encode_vec(&body);
    framed.push(FRAME_DELIMITER);
    framed
}

/// Decodes one frame with its delimiter already stripped.
pub fn decode_frame(encoded: &[u8]) -> Result<Vec<u8>, FrameError> {
    let mut body = cobs::decode_vec(encoded).map_err(|_| FrameError::Cobs)?;
    if body.len() < CRC_LEN {
        return Err(FrameError::TooShort(body.len()));
    }

    let split = body.len() - CRC_LEN;
    let mut crc = [0u8; CRC_LEN];
    crc.copy_from_slice(&body[split..]);
    body.truncate(split);

    let expected = u32::from_le_bytes(crc);
    let actual = crc32fast::hash(&body);
    if expected != actual {
        return Err(FrameError::Crc { expected, actual });
    }
    Ok(body)
}

/// Accumulates raw serial bytes and yields complete frames.
pub struct FrameDecoder {
    buf: BytesMut,
    max_frame: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_max_frame(DEFAULT_MAX_FRAME)
    }

    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
            max_frame,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        if self.buf.len() > self.max_frame && !self.buf.contains(&FRAME_DELIMITER) {
            warn!(
                "discarding {} bytes without a frame delimiter",
                self.buf.len()
            );
            self.buf.clear();
        }
    }

    pub fn next_frame(&mut self) -> Option<Result<Vec<u8>, FrameError>> {
        loop {
            let pos = self.buf.iter().position(|b| *b == FRAME_DELIMITER)?;
            let chunk = self.buf.split_to(pos + 1);
            if pos == 0 {
                continue;
            }
            return Some(decode_frame(&chunk[..pos]));
        }
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}
