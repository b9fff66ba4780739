use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type HandshakeResult<T> = Result<T, HandshakeError>;
