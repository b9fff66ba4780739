use amf::amf0::Value as Amf0Value;
use utils::traits::reader::ReadFrom;

use super::CommandMessage;
use crate::chunk::errors::ChunkMessageError;

impl<'a> ReadFrom<&'a [u8]> for CommandMessage {
    type Error = ChunkMessageError;
    fn read_from(reader: &mut &'a [u8]) -> Result<Self, Self::Error> {
        let mut values = Vec::new();
        while !reader.is_empty() {
            values.push(Amf0Value::read_from(&mut *reader)?);
        }
        Ok(CommandMessage { values })
    }
}
