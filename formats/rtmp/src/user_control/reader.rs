use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use utils::traits::reader::ReadFrom;

use super::UserControlMessage;
use crate::chunk::errors::ChunkMessageError;

impl<R: io::Read> ReadFrom<R> for UserControlMessage {
    type Error = ChunkMessageError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let event_type = reader.read_u16::<BigEndian>()?.try_into()?;
        let mut event_data = Vec::new();
        reader.read_to_end(&mut event_data)?;
        Ok(UserControlMessage {
            event_type,
            event_data,
        })
    }
}
