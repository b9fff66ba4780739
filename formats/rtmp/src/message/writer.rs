use std::io;

use utils::traits::writer::WriteTo;

use super::RtmpMessage;
use crate::chunk::errors::ChunkMessageError;

impl<W: io::Write> WriteTo<W> for RtmpMessage {
    type Error = ChunkMessageError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        match self {
            RtmpMessage::SetChunkSize(message) => message.write_to(writer),
            RtmpMessage::UserControl(message) => message.write_to(writer),
            RtmpMessage::WindowAckSize(message) => message.write_to(writer),
            RtmpMessage::SetPeerBandwidth(message) => message.write_to(writer),
            RtmpMessage::SharedObject(message) => message.write_to(writer),
            RtmpMessage::Command(message) => message.write_to(writer),
        }
    }
}
