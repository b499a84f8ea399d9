//! Wire messages for transports
//!
//! Peer transport, discovery and sync live outside this crate. This module
//! gives them typed messages and a framing codec.

pub mod codec;
pub mod message;

pub use codec::{CodecError, MessageCodec, FRAME_HEADER_SIZE};
pub use message::{Message, MessageType, MAGIC, MAX_FRAME_SIZE};
