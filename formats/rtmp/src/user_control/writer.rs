use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use super::UserControlMessage;
use crate::chunk::errors::ChunkMessageError;

impl<W: io::Write> WriteTo<W> for UserControlMessage {
    type Error = ChunkMessageError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u16::<BigEndian>(self.event_type.into())?;
        writer.write_all(&self.event_data)?;
        Ok(())
    }
}
