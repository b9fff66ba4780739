use crate::chunk::errors::ChunkMessageError;

///! @see: 7.1.7. User Control Message Events
pub mod reader;
pub mod writer;

/// The event payload stays opaque: ping responses echo it verbatim and the
/// connect sequence compares it byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserControlMessage {
    pub event_type: UserControlEventType,
    pub event_data: Vec<u8>,
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserControlEventType {
    StreamBegin = 0,
    StreamEOF = 1,
    StreamDry = 2,
    SetBufferLength = 3,
    StreamIsRecorded = 4,
    PingRequest = 6,
    PingResponse = 7,
}

impl From<UserControlEventType> for u16 {
    fn from(value: UserControlEventType) -> Self {
        value as u16
    }
}

impl TryFrom<u16> for UserControlEventType {
    type Error = ChunkMessageError;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UserControlEventType::StreamBegin),
            1 => Ok(UserControlEventType::StreamEOF),
            2 => Ok(UserControlEventType::StreamDry),
            3 => Ok(UserControlEventType::SetBufferLength),
            4 => Ok(UserControlEventType::StreamIsRecorded),
            6 => Ok(UserControlEventType::PingRequest),
            7 => Ok(UserControlEventType::PingResponse),
            _ => Err(ChunkMessageError::UnknownEventType(value)),
        }
    }
}
