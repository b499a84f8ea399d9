//! Frame codec for transports
//!
//! Frame layout: `magic(4) + type(1) + length(8) + body`. The codec plugs
//! into any `tokio_util` framed transport; it owns no sockets itself.

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

use crate::core::ser::DecodeError;
use crate::network::message::{Message, MessageType, MAGIC, MAX_FRAME_SIZE};

/// Bytes before the body in every frame
pub const FRAME_HEADER_SIZE: usize = 4 + 1 + 8;

/// Framing errors
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Message codec for length-prefixed framing
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageCodec;

impl Encoder<Message> for MessageCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let data = item.to_bytes();
        if data.len() > MAX_FRAME_SIZE {
            return Err(DecodeError::FrameTooLarge {
                len: data.len() as u64,
                max: MAX_FRAME_SIZE,
            }
            .into());
        }

        dst.reserve(FRAME_HEADER_SIZE + data.len());
        dst.put_slice(&MAGIC);
        dst.put_u8(item.message_type() as u8);
        dst.put_u64(data.len() as u64);
        dst.put_slice(&data);

        Ok(())
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        if src[..4] != MAGIC {
            return Err(DecodeError::InvalidMagic.into());
        }

        let message_type = MessageType::try_from(src[4])?;

        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&src[5..FRAME_HEADER_SIZE]);
        let len = u64::from_be_bytes(len_bytes);
        if len > MAX_FRAME_SIZE as u64 {
            return Err(DecodeError::FrameTooLarge {
                len,
                max: MAX_FRAME_SIZE,
            }
            .into());
        }
        let len = len as usize;

        if src.len() < FRAME_HEADER_SIZE + len {
            src.reserve(FRAME_HEADER_SIZE + len - src.len());
            return Ok(None);
        }

        src.advance(FRAME_HEADER_SIZE);
        let data = src.split_to(len);

        let message = Message::from_bytes(message_type, &data)?;
        log::debug!("Decoded {:?} message of {} bytes", message_type, len);
        Ok(Some(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_util::{transaction, valid_block, Fixture};
    use crate::core::BlockHeader;

    #[test]
    fn test_message_codec() {
        let mut codec = MessageCodec;
        let block = valid_block(&Fixture::new());

        let mut buf = BytesMut::new();
        codec.encode(Message::Block(block.clone()), &mut buf).unwrap();
        assert_eq!(&buf[..4], &MAGIC);
        assert_eq!(buf[4], MessageType::Block as u8);

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, Message::Block(block));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_partial_frame_waits() {
        let mut codec = MessageCodec;
        let tx = transaction(&[9], &[8], 1);

        let mut full = BytesMut::new();
        codec
            .encode(Message::Transaction(tx.clone()), &mut full)
            .unwrap();

        let mut buf = BytesMut::from(&full[..full.len() - 1]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&full[full.len() - 1..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Message::Transaction(tx))
        );
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut codec = MessageCodec;
        let mut buf = BytesMut::new();
        let header = BlockHeader::default();
        codec.encode(Message::Header(header.clone()), &mut buf).unwrap();
        codec.encode(Message::Header(header.clone()), &mut buf).unwrap();

        assert!(codec.decode(&mut buf).unwrap().is_some());
        assert!(codec.decode(&mut buf).unwrap().is_some());
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_bad_magic() {
        let mut codec = MessageCodec;
        let mut buf = BytesMut::from(&b"XXXX\x01\0\0\0\0\0\0\0\0"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::Decode(DecodeError::InvalidMagic))
        ));
    }

    #[test]
    fn test_unknown_type() {
        let mut codec = MessageCodec;
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(9);
        buf.put_u64(0);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::Decode(DecodeError::UnknownMessageType(9)))
        ));
    }

    #[test]
    fn test_oversized_frame_rejected_before_body() {
        let mut codec = MessageCodec;
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(MessageType::Block as u8);
        buf.put_u64(u64::MAX);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::Decode(DecodeError::FrameTooLarge { .. }))
        ));
    }
}
