use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use super::{SharedObjectEvent, SharedObjectMessage};
use crate::chunk::errors::{ChunkMessageError, ChunkMessageResult};

impl<W: io::Write> WriteTo<W> for SharedObjectMessage {
    type Error = ChunkMessageError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        write_utf8(writer, &self.name)?;
        writer.write_u32::<BigEndian>(self.version)?;
        writer.write_all(&self.flags)?;
        for event in &self.events {
            event.write_to(writer)?;
        }
        Ok(())
    }
}

impl<W: io::Write> WriteTo<W> for SharedObjectEvent {
    type Error = ChunkMessageError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        // the declared payload size must match the written bytes exactly,
        // so serialize into a scratch buffer first
        let mut payload: Vec<u8> = Vec::new();
        match self {
            SharedObjectEvent::Use
            | SharedObjectEvent::Release
            | SharedObjectEvent::Clear
            | SharedObjectEvent::UseSuccess => {}
            SharedObjectEvent::Change(entries) => {
                for pair in entries {
                    write_utf8(&mut payload, &pair.key)?;
                    pair.value.write_to(&mut payload)?;
                }
            }
            SharedObjectEvent::Message(arguments) => {
                for argument in arguments {
                    argument.write_to(&mut payload)?;
                }
            }
            SharedObjectEvent::Delete(key) => {
                write_utf8(&mut payload, key)?;
            }
        }

        writer.write_u8(self.event_type().into())?;
        writer.write_u32::<BigEndian>(payload.len() as u32)?;
        writer.write_all(&payload)?;
        Ok(())
    }
}

/// Bare AMF0 UTF-8 string, a u16 length prefix with no type marker.
fn write_utf8<W: io::Write>(writer: &mut W, value: &str) -> ChunkMessageResult<()> {
    writer.write_u16::<BigEndian>(value.len() as u16)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}
