use std::io;

use rtmp_formats::{chunk::errors::ChunkMessageError, handshake::errors::HandshakeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtmpServerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("handshake failed: {0:?}")]
    HandshakeFailed(#[from] HandshakeError),
    #[error("chunk message codec failed: {0:?}")]
    ChunkMessageFailed(#[from] ChunkMessageError),
    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),
}

pub type RtmpServerResult<T> = Result<T, RtmpServerError>;
