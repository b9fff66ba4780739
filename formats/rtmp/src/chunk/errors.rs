use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkMessageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid basic header: {0}")]
    InvalidBasicHeader(String),
    #[error("chunk stream id mismatch, previous: {previous}, new: {new}")]
    ChunkStreamIdMismatch { previous: u32, new: u32 },
    #[error("no previous header on chunk stream {0} to inherit from")]
    NeedContext(u32),
    #[error("continuation chunk header must be type 3: {0}")]
    UnexpectedContinuationHeader(String),
    #[error("invalid chunk size: {0}, expect a value in [1, 65536]")]
    InvalidChunkSize(u32),
    #[error("unknown message type: {0}")]
    UnknownMessageType(u8),
    #[error("unknown user control event type: {0}")]
    UnknownEventType(u16),
    #[error("unknown shared object event type: {0}")]
    UnknownSharedObjectEventType(u8),
    #[error("unknown peer bandwidth limit type: {0}")]
    UnknownBandwidthLimitType(u8),
    #[error("shared object event {event_type} must carry an empty payload, declared {size} bytes")]
    NonEmptyEventPayload { event_type: u8, size: u32 },
    #[error("shared object event declared {declared} payload bytes, consumed {consumed}")]
    EventPayloadSizeMismatch { declared: u32, consumed: usize },
    #[error("duplicate key in shared object change event: {0}")]
    DuplicateEventKey(String),
    #[error("amf0 decode failed: {0}")]
    Amf0Decode(#[from] amf::error::DecodeError),
    #[error("unexpected amf value: {0}")]
    UnexpectedAmfType(String),
    // a whole chunk was consumed but the message it belongs to is not finished
    #[error("incomplete chunk")]
    IncompleteChunk,
}

pub type ChunkMessageResult<T> = Result<T, ChunkMessageError>;
