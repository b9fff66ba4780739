use std::io;

use utils::traits::writer::WriteTo;

use super::CommandMessage;
use crate::chunk::errors::ChunkMessageError;

impl<W: io::Write> WriteTo<W> for CommandMessage {
    type Error = ChunkMessageError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        for value in &self.values {
            value.write_to(&mut *writer)?;
        }
        Ok(())
    }
}
