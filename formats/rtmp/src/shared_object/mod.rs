use amf::{Pair, amf0::Value as Amf0Value};

use crate::chunk::errors::ChunkMessageError;

pub mod reader;
pub mod writer;

pub const SHARED_OBJECT_FLAGS_LENGTH: usize = 8;

/// One remote shared object message. A single message may carry any number
/// of events, applied in order by the receiving side.
///
/// Body layout: name as a bare AMF0 UTF-8 string (no type marker), current
/// version as u32, 8 opaque flag bytes (sent as zero), then events until the
/// end of the body.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedObjectMessage {
    pub name: String,
    pub version: u32,
    pub flags: [u8; SHARED_OBJECT_FLAGS_LENGTH],
    pub events: Vec<SharedObjectEvent>,
}

impl SharedObjectMessage {
    pub fn new(name: impl Into<String>, events: Vec<SharedObjectEvent>) -> Self {
        Self {
            name: name.into(),
            version: 0,
            flags: [0; SHARED_OBJECT_FLAGS_LENGTH],
            events,
        }
    }

    /// The message a client sends to start receiving updates for the named
    /// object.
    pub fn use_request(name: impl Into<String>) -> Self {
        Self::new(name, vec![SharedObjectEvent::Use])
    }
}

/// Event framing on the wire: u8 event type, u32 payload size, exactly that
/// many payload bytes. Use, Release, Clear and UseSuccess carry none.
#[derive(Debug, Clone, PartialEq)]
pub enum SharedObjectEvent {
    Use,
    Release,
    /// Key/value pairs, keys unique within one event. Keys are bare AMF0
    /// UTF-8 strings, values are marked AMF0 values.
    Change(Vec<Pair<String, Amf0Value>>),
    /// A sequence of marked AMF0 values.
    Message(Vec<Amf0Value>),
    Clear,
    /// The key to remove, a bare AMF0 UTF-8 string.
    Delete(String),
    UseSuccess,
}

impl SharedObjectEvent {
    pub fn event_type(&self) -> SharedObjectEventType {
        match self {
            SharedObjectEvent::Use => SharedObjectEventType::Use,
            SharedObjectEvent::Release => SharedObjectEventType::Release,
            SharedObjectEvent::Change(_) => SharedObjectEventType::Change,
            SharedObjectEvent::Message(_) => SharedObjectEventType::Message,
            SharedObjectEvent::Clear => SharedObjectEventType::Clear,
            SharedObjectEvent::Delete(_) => SharedObjectEventType::Delete,
            SharedObjectEvent::UseSuccess => SharedObjectEventType::UseSuccess,
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedObjectEventType {
    Use = 1,
    Release = 2,
    Change = 4,
    Message = 6,
    Clear = 8,
    Delete = 9,
    UseSuccess = 11,
}

impl From<SharedObjectEventType> for u8 {
    fn from(value: SharedObjectEventType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for SharedObjectEventType {
    type Error = ChunkMessageError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SharedObjectEventType::Use),
            2 => Ok(SharedObjectEventType::Release),
            4 => Ok(SharedObjectEventType::Change),
            6 => Ok(SharedObjectEventType::Message),
            8 => Ok(SharedObjectEventType::Clear),
            9 => Ok(SharedObjectEventType::Delete),
            11 => Ok(SharedObjectEventType::UseSuccess),
            _ => Err(ChunkMessageError::UnknownSharedObjectEventType(value)),
        }
    }
}
