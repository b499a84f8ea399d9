//! Network message types
//!
//! A message is one consensus entity tagged with a type byte. The body is the
//! entity's own wire encoding.

use crate::core::ser::{Decode, DecodeError, Encode};
use crate::core::{Block, BlockHeader, Transaction};

/// Magic bytes for message framing
pub const MAGIC: [u8; 4] = *b"MWLG";

/// Largest message body accepted on the wire (32 MiB)
pub const MAX_FRAME_SIZE: usize = 32 * 1024 * 1024;

/// Type byte carried in every frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Block = 1,
    Transaction = 2,
    Header = 3,
}

impl TryFrom<u8> for MessageType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageType::Block),
            2 => Ok(MessageType::Transaction),
            3 => Ok(MessageType::Header),
            other => Err(DecodeError::UnknownMessageType(other)),
        }
    }
}

/// Network messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A full block
    Block(Block),
    /// A transaction for the pool
    Transaction(Transaction),
    /// A header announced ahead of its block
    Header(BlockHeader),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Block(_) => MessageType::Block,
            Message::Transaction(_) => MessageType::Transaction,
            Message::Header(_) => MessageType::Header,
        }
    }

    /// Body bytes, without framing
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Message::Block(block) => block.encode(),
            Message::Transaction(tx) => tx.encode(),
            Message::Header(header) => header.encode(),
        }
    }

    /// Decode a body of the given type. The body must be consumed exactly.
    pub fn from_bytes(message_type: MessageType, body: &[u8]) -> Result<Self, DecodeError> {
        Ok(match message_type {
            MessageType::Block => Message::Block(Block::decode(body)?),
            MessageType::Transaction => Message::Transaction(Transaction::decode(body)?),
            MessageType::Header => Message::Header(BlockHeader::decode(body)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_bytes() {
        for ty in [MessageType::Block, MessageType::Transaction, MessageType::Header] {
            assert_eq!(MessageType::try_from(ty as u8), Ok(ty));
        }
        assert_eq!(
            MessageType::try_from(0),
            Err(DecodeError::UnknownMessageType(0))
        );
    }

    #[test]
    fn test_header_message_body() {
        let message = Message::Header(BlockHeader::default());
        let body = message.to_bytes();

        assert_eq!(body, BlockHeader::default().encode());
        assert_eq!(
            Message::from_bytes(MessageType::Header, &body).unwrap(),
            message
        );
    }

    #[test]
    fn test_wrong_type_fails_to_decode() {
        let body = Message::Header(BlockHeader::default()).to_bytes();
        assert!(Message::from_bytes(MessageType::Transaction, &body).is_err());
    }
}
