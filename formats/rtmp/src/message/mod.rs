use crate::{
    chunk::errors::ChunkMessageError,
    command::CommandMessage,
    protocol_control::{SetChunkSize, SetPeerBandwidth, WindowAckSize},
    shared_object::SharedObjectMessage,
    user_control::UserControlMessage,
};

pub mod reader;
pub mod writer;

/// Every message the protocol core understands. Anything else on the wire is
/// a fatal decode error.
#[derive(Debug, Clone, PartialEq)]
pub enum RtmpMessage {
    SetChunkSize(SetChunkSize),
    UserControl(UserControlMessage),
    WindowAckSize(WindowAckSize),
    SetPeerBandwidth(SetPeerBandwidth),
    SharedObject(SharedObjectMessage),
    Command(CommandMessage),
}

impl RtmpMessage {
    pub fn message_type(&self) -> RtmpMessageType {
        match self {
            RtmpMessage::SetChunkSize(_) => RtmpMessageType::SetChunkSize,
            RtmpMessage::UserControl(_) => RtmpMessageType::UserControl,
            RtmpMessage::WindowAckSize(_) => RtmpMessageType::WindowAckSize,
            RtmpMessage::SetPeerBandwidth(_) => RtmpMessageType::SetPeerBandwidth,
            RtmpMessage::SharedObject(_) => RtmpMessageType::SharedObject,
            RtmpMessage::Command(_) => RtmpMessageType::Command,
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmpMessageType {
    SetChunkSize = 1,
    UserControl = 4,
    WindowAckSize = 5,
    SetPeerBandwidth = 6,
    SharedObject = 19,
    Command = 20,
}

impl From<RtmpMessageType> for u8 {
    fn from(value: RtmpMessageType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for RtmpMessageType {
    type Error = ChunkMessageError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RtmpMessageType::SetChunkSize),
            4 => Ok(RtmpMessageType::UserControl),
            5 => Ok(RtmpMessageType::WindowAckSize),
            6 => Ok(RtmpMessageType::SetPeerBandwidth),
            19 => Ok(RtmpMessageType::SharedObject),
            20 => Ok(RtmpMessageType::Command),
            _ => Err(ChunkMessageError::UnknownMessageType(value)),
        }
    }
}
