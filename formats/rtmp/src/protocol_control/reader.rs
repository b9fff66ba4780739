use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use utils::traits::reader::ReadFrom;

use super::{
    SetChunkSize, SetPeerBandwidth, WindowAckSize,
    consts::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE},
};
use crate::chunk::errors::ChunkMessageError;

impl<R: io::Read> ReadFrom<R> for SetChunkSize {
    type Error = ChunkMessageError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let chunk_size = reader.read_u32::<BigEndian>()?;
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            return Err(ChunkMessageError::InvalidChunkSize(chunk_size));
        }
        Ok(SetChunkSize { chunk_size })
    }
}

impl<R: io::Read> ReadFrom<R> for WindowAckSize {
    type Error = ChunkMessageError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        Ok(WindowAckSize {
            size: reader.read_u32::<BigEndian>()?,
        })
    }
}

impl<R: io::Read> ReadFrom<R> for SetPeerBandwidth {
    type Error = ChunkMessageError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let size = reader.read_u32::<BigEndian>()?;
        let limit_type = reader.read_u8()?;
        Ok(SetPeerBandwidth {
            size,
            limit_type: limit_type.try_into()?,
        })
    }
}
