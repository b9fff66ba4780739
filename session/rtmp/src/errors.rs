use std::io;

use rtmp_formats::{chunk::errors::ChunkMessageError, handshake::errors::HandshakeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtmpSessionError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("handshake failed: {0:?}")]
    HandshakeFailed(#[from] HandshakeError),
    #[error("chunk message codec failed: {0:?}")]
    ChunkMessageFailed(#[from] ChunkMessageError),
    #[error("unexpected message before connect completed: {0}")]
    UnexpectedPreConnectMessage(String),
    #[error("no handler claimed the message: {0}")]
    UnexpectedMessage(String),
    #[error("shared object {0} got its first message without use success and clear")]
    UseNotAcknowledged(String),
    #[error("shared object {object} cannot delete missing key {key}")]
    MissingSharedObjectKey { object: String, key: String },
    #[error("unexpected shared object event: {0}")]
    UnexpectedSharedObjectEvent(String),
}

pub type RtmpSessionResult<T> = Result<T, RtmpSessionError>;
