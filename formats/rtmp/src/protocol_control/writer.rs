use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use super::{
    SetChunkSize, SetPeerBandwidth, WindowAckSize,
    consts::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE},
};
use crate::chunk::errors::ChunkMessageError;

impl<W: io::Write> WriteTo<W> for SetChunkSize {
    type Error = ChunkMessageError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(ChunkMessageError::InvalidChunkSize(self.chunk_size));
        }
        writer.write_u32::<BigEndian>(self.chunk_size)?;
        Ok(())
    }
}

impl<W: io::Write> WriteTo<W> for WindowAckSize {
    type Error = ChunkMessageError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u32::<BigEndian>(self.size)?;
        Ok(())
    }
}

impl<W: io::Write> WriteTo<W> for SetPeerBandwidth {
    type Error = ChunkMessageError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u32::<BigEndian>(self.size)?;
        writer.write_u8(self.limit_type.into())?;
        Ok(())
    }
}
