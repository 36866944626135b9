/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tokio codec for gateway message framing.
//!
//! Every message travels as a 4-byte big-endian payload length followed by
//! the payload. The codec only splits frames; field parsing lives in
//! [`crate::message`].

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Errors that can occur during codec operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Frame exceeds maximum size.
    #[error("frame too large: {size} bytes exceeds maximum {max_size}")]
    FrameTooLarge {
        /// Declared frame size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Size of the length prefix.
const LENGTH_PREFIX: usize = 4;

/// Default maximum payload size (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Tokio codec for length-prefixed gateway frames.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    /// Maximum payload size in bytes.
    max_frame_size: usize,
}

impl FrameCodec {
    /// Creates a new codec with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Sets the maximum payload size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Returns the maximum payload size.
    #[must_use]
    pub const fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_PREFIX {
            return Ok(None);
        }

        let mut prefix = [0u8; LENGTH_PREFIX];
        prefix.copy_from_slice(&src[..LENGTH_PREFIX]);
        let size = u32::from_be_bytes(prefix) as usize;

        if size > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size,
                max_size: self.max_frame_size,
            });
        }

        let total = LENGTH_PREFIX + size;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX);
        Ok(Some(src.split_to(size)))
    }
}

impl Encoder<&[u8]> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size: item.len(),
                max_size: self.max_frame_size,
            });
        }
        let size = u32::try_from(item.len()).map_err(|_| CodecError::FrameTooLarge {
            size: item.len(),
            max_size: self.max_frame_size,
        })?;

        dst.reserve(LENGTH_PREFIX + item.len());
        dst.put_u32(size);
        dst.put_slice(item);
        Ok(())
    }
}

impl Encoder<BytesMut> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<&[u8]>>::encode(self, &item[..], dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u32(payload.len() as u32);
        buf.put_slice(payload);
        buf
    }

    #[test]
    fn test_codec_decode_complete_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = frame(b"49\x001\x00");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result.as_deref(), Some(&b"49\x001\x00"[..]));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_decode_incomplete() {
        let mut codec = FrameCodec::new();
        let full = frame(b"49\x001\x00");
        let mut buf = BytesMut::from(&full[..full.len() - 2]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), full.len() - 2);

        let mut buf = BytesMut::from(&full[..3]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_codec_decode_two_frames_in_one_read() {
        let mut codec = FrameCodec::new();
        let mut buf = frame(b"9\x001\x0042\x00");
        buf.extend_from_slice(&frame(b"49\x001\x001700000000\x00"));

        let first = codec.decode(&mut buf).unwrap().unwrap();
        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first[..], b"9\x001\x0042\x00");
        assert_eq!(&second[..], b"49\x001\x001700000000\x00");
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_codec_decode_too_large() {
        let mut codec = FrameCodec::new().with_max_frame_size(8);
        let mut buf = frame(b"0123456789");

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(CodecError::FrameTooLarge {
                size: 10,
                max_size: 8
            })
        ));
    }

    #[test]
    fn test_codec_encode() {
        let mut codec = FrameCodec::new();
        let mut dst = BytesMut::new();

        codec.encode(&b"4\x001\x007\x00"[..], &mut dst).unwrap();
        assert_eq!(&dst[..4], &[0, 0, 0, 6]);
        assert_eq!(&dst[4..], b"4\x001\x007\x00");
    }
}
