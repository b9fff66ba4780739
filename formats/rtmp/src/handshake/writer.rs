use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use super::{C0S0Packet, HandshakePacket, errors::HandshakeError};

impl<W: io::Write> WriteTo<W> for C0S0Packet {
    type Error = HandshakeError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u8(self.version)?;
        Ok(())
    }
}

impl<W: io::Write> WriteTo<W> for HandshakePacket {
    type Error = HandshakeError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u32::<BigEndian>(self.first)?;
        writer.write_u32::<BigEndian>(self.second)?;
        writer.write_all(&self.payload)?;
        Ok(())
    }
}
