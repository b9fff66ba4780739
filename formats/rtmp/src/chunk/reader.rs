use std::{
    cmp::min,
    collections::HashMap,
    io::{Cursor, Read},
};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use tokio_util::bytes::{Buf, BytesMut};
use utils::traits::reader::ReadRemainingFrom;

use super::{
    ChunkBasicHeader, ChunkMessage, ChunkMessageCommonHeader, ChunkMessageHeader,
    ChunkMessageHeaderType0, ChunkMessageHeaderType1, ChunkMessageHeaderType2,
    ChunkMessageHeaderType3, Csid,
    consts::{DEFAULT_CHUNK_SIZE, MAX_TIMESTAMP},
    errors::{ChunkMessageError, ChunkMessageResult},
};
use crate::{
    message::{RtmpMessage, RtmpMessageType},
    protocol_control::consts::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE},
};

#[derive(Debug)]
struct ChunkPayload {
    payload: BytesMut,
    remaining: usize,
}

#[derive(Debug)]
struct ReadContext {
    header: ChunkMessageCommonHeader,
    incomplete: Option<ChunkPayload>,
}

#[derive(Debug)]
pub struct Reader {
    context: HashMap<Csid, ReadContext>,
    chunk_size: usize,
}

impl Reader {
    pub fn new() -> Self {
        Self {
            context: HashMap::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn set_chunk_size(&mut self, chunk_size: u32) -> ChunkMessageResult<()> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            return Err(ChunkMessageError::InvalidChunkSize(chunk_size));
        }
        self.chunk_size = chunk_size as usize;
        Ok(())
    }

    /// Tries to decode one whole message from the buffered bytes.
    ///
    /// `Ok(None)` means more bytes are needed and nothing was committed, the
    /// caller must not advance the buffer. `Err(IncompleteChunk)` means one
    /// full chunk went into the per-channel accumulator, the caller advances
    /// the buffer and keeps feeding. `Ok(Some(..))` yields a reassembled
    /// message and the caller advances past it.
    pub fn read(
        &mut self,
        reader: &mut Cursor<&BytesMut>,
    ) -> ChunkMessageResult<Option<ChunkMessage>> {
        if !reader.has_remaining() {
            return Ok(None);
        }

        let Some(basic_header) = Self::try_read_basic_header(reader)? else {
            return Ok(None);
        };
        let Some(message_header) = Self::try_read_message_header(reader, basic_header.fmt)? else {
            return Ok(None);
        };

        let csid = basic_header.chunk_stream_id;
        let continuation = self
            .context
            .get(&csid)
            .is_some_and(|ctx| ctx.incomplete.is_some());
        if continuation && !matches!(message_header, ChunkMessageHeader::Type3(_)) {
            return Err(ChunkMessageError::UnexpectedContinuationHeader(format!(
                "got a type {} header on chunk stream {} in the middle of a message",
                message_header.fmt(),
                csid
            )));
        }

        let header = Self::merge_header(
            csid,
            &message_header,
            self.context.get(&csid).map(|ctx| &ctx.header),
        )?;

        // WORKAROUND: the RTMP specification states that no extended timestamp
        // field follows a type 3 header, but Flash Player 10.1.85.3 and
        // FMS 3.0.2.217 both send one after every continuation header of a
        // message whose timestamp needs the extended field.
        if continuation && header.timestamp >= MAX_TIMESTAMP {
            if reader.remaining() < 4 {
                return Ok(None);
            }
            reader.read_u32::<BigEndian>()?;
        }

        let message_length = header.message_length as usize;
        let remaining = self
            .context
            .get(&csid)
            .and_then(|ctx| ctx.incomplete.as_ref())
            .map_or(message_length, |chunk| chunk.remaining);
        let bytes_need = min(remaining, self.chunk_size);
        if reader.remaining() < bytes_need {
            return Ok(None);
        }

        // everything for this chunk is buffered, commit it
        let mut bytes = vec![0; bytes_need];
        reader.read_exact(&mut bytes)?;

        let ctx = self
            .context
            .entry(csid)
            .and_modify(|ctx| ctx.header = header.clone())
            .or_insert_with(|| ReadContext {
                header: header.clone(),
                incomplete: None,
            });
        let chunk = ctx.incomplete.get_or_insert_with(|| ChunkPayload {
            payload: BytesMut::with_capacity(message_length),
            remaining: message_length,
        });
        chunk.payload.extend_from_slice(&bytes);
        chunk.remaining -= bytes_need;

        if chunk.remaining > 0 {
            return Err(ChunkMessageError::IncompleteChunk);
        }

        let payload = ctx
            .incomplete
            .take()
            .expect("this cannot be none")
            .payload;
        let message_type: RtmpMessageType = header.message_type_id.try_into()?;
        let message = RtmpMessage::read_remaining_from(message_type, &mut &payload[..])?;

        Ok(Some(ChunkMessage { header, message }))
    }

    fn try_read_basic_header(
        reader: &mut Cursor<&BytesMut>,
    ) -> ChunkMessageResult<Option<ChunkBasicHeader>> {
        if !reader.has_remaining() {
            return Ok(None);
        }

        let first_byte = reader.read_u8()?;
        let fmt = first_byte >> 6;
        let csid = match (first_byte & 0b0011_1111) as Csid {
            0 => {
                if !reader.has_remaining() {
                    return Ok(None);
                }
                reader.read_u8()? as Csid + 64
            }
            1 => {
                if reader.remaining() < 2 {
                    return Ok(None);
                }
                let low = reader.read_u8()? as Csid;
                let high = reader.read_u8()? as Csid;
                low + 64 + (high << 8)
            }
            csid => csid,
        };

        Ok(Some(ChunkBasicHeader::new(fmt, csid)?))
    }

    fn try_read_message_header(
        reader: &mut Cursor<&BytesMut>,
        fmt: u8,
    ) -> ChunkMessageResult<Option<ChunkMessageHeader>> {
        match fmt {
            0 => {
                if reader.remaining() < 11 {
                    return Ok(None);
                }
                let timestamp = reader.read_u24::<BigEndian>()?;
                let message_length = reader.read_u24::<BigEndian>()?;
                let message_type_id = reader.read_u8()?;
                // the one little endian field of the protocol
                let message_stream_id = reader.read_u32::<LittleEndian>()?;
                let Some(timestamp) = Self::try_read_extended_timestamp(reader, timestamp)? else {
                    return Ok(None);
                };
                Ok(Some(ChunkMessageHeader::Type0(ChunkMessageHeaderType0 {
                    timestamp,
                    message_length,
                    message_type_id,
                    message_stream_id,
                })))
            }
            1 => {
                if reader.remaining() < 7 {
                    return Ok(None);
                }
                let timestamp = reader.read_u24::<BigEndian>()?;
                let message_length = reader.read_u24::<BigEndian>()?;
                let message_type_id = reader.read_u8()?;
                let Some(timestamp) = Self::try_read_extended_timestamp(reader, timestamp)? else {
                    return Ok(None);
                };
                Ok(Some(ChunkMessageHeader::Type1(ChunkMessageHeaderType1 {
                    timestamp,
                    message_length,
                    message_type_id,
                })))
            }
            2 => {
                if reader.remaining() < 3 {
                    return Ok(None);
                }
                let timestamp = reader.read_u24::<BigEndian>()?;
                let Some(timestamp) = Self::try_read_extended_timestamp(reader, timestamp)? else {
                    return Ok(None);
                };
                Ok(Some(ChunkMessageHeader::Type2(ChunkMessageHeaderType2 {
                    timestamp,
                })))
            }
            3 => Ok(Some(ChunkMessageHeader::Type3(ChunkMessageHeaderType3 {}))),
            _ => unreachable!("fmt is two bits wide"),
        }
    }

    fn try_read_extended_timestamp(
        reader: &mut Cursor<&BytesMut>,
        timestamp: u32,
    ) -> ChunkMessageResult<Option<u32>> {
        if timestamp != MAX_TIMESTAMP {
            return Ok(Some(timestamp));
        }
        if reader.remaining() < 4 {
            return Ok(None);
        }
        Ok(Some(reader.read_u32::<BigEndian>()?))
    }

    fn merge_header(
        csid: Csid,
        header: &ChunkMessageHeader,
        previous: Option<&ChunkMessageCommonHeader>,
    ) -> ChunkMessageResult<ChunkMessageCommonHeader> {
        match header {
            ChunkMessageHeader::Type0(header) => Ok(ChunkMessageCommonHeader {
                chunk_stream_id: csid,
                timestamp: header.timestamp,
                message_length: header.message_length,
                message_type_id: header.message_type_id,
                message_stream_id: header.message_stream_id,
            }),
            ChunkMessageHeader::Type1(header) => {
                let previous = previous.ok_or(ChunkMessageError::NeedContext(csid))?;
                Ok(ChunkMessageCommonHeader {
                    chunk_stream_id: csid,
                    timestamp: header.timestamp,
                    message_length: header.message_length,
                    message_type_id: header.message_type_id,
                    message_stream_id: previous.message_stream_id,
                })
            }
            ChunkMessageHeader::Type2(header) => {
                let previous = previous.ok_or(ChunkMessageError::NeedContext(csid))?;
                Ok(ChunkMessageCommonHeader {
                    timestamp: header.timestamp,
                    ..previous.clone()
                })
            }
            ChunkMessageHeader::Type3(_) => previous
                .cloned()
                .ok_or(ChunkMessageError::NeedContext(csid)),
        }
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tokio_util::bytes::{Buf, BytesMut};

    use super::Reader;
    use crate::{
        chunk::{
            ChunkMessage, ChunkMessageCommonHeader, consts::MAX_TIMESTAMP,
            errors::ChunkMessageError, writer::Writer,
        },
        command::CommandMessage,
        message::RtmpMessage,
        user_control::{UserControlEventType, UserControlMessage},
    };

    fn header(
        timestamp: u32,
        message_length: u32,
        message_type_id: u8,
        message_stream_id: u32,
    ) -> ChunkMessageCommonHeader {
        ChunkMessageCommonHeader {
            chunk_stream_id: 3,
            timestamp,
            message_length,
            message_type_id,
            message_stream_id,
        }
    }

    fn encode(
        header: &ChunkMessageCommonHeader,
        previous: Option<&ChunkMessageCommonHeader>,
    ) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.write_header(header, previous).unwrap();
        writer.buffer().to_vec()
    }

    fn decode(
        bytes: &[u8],
        previous: Option<&ChunkMessageCommonHeader>,
    ) -> ChunkMessageCommonHeader {
        let buf = BytesMut::from(bytes);
        let mut cursor = Cursor::new(&buf);
        let basic_header = Reader::try_read_basic_header(&mut cursor).unwrap().unwrap();
        let message_header = Reader::try_read_message_header(&mut cursor, basic_header.fmt)
            .unwrap()
            .unwrap();
        let merged =
            Reader::merge_header(basic_header.chunk_stream_id, &message_header, previous).unwrap();
        assert!(!cursor.has_remaining(), "undecoded header bytes left over");
        merged
    }

    fn read_one_message(reader: &mut Reader, bytes: &[u8]) -> ChunkMessage {
        let mut buf = BytesMut::from(bytes);
        loop {
            let mut cursor = Cursor::new(&buf);
            match reader.read(&mut cursor) {
                Ok(Some(message)) => {
                    let consumed = cursor.position() as usize;
                    buf.advance(consumed);
                    assert!(buf.is_empty(), "trailing bytes after the message");
                    return message;
                }
                Ok(None) => panic!("reader starved on a complete message"),
                Err(ChunkMessageError::IncompleteChunk) => {
                    let consumed = cursor.position() as usize;
                    buf.advance(consumed);
                }
                Err(err) => panic!("unexpected read error: {:?}", err),
            }
        }
    }

    #[test]
    fn full_header_round_trip() {
        let h = header(100, 400, 20, 1);
        let bytes = encode(&h, None);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes[0], 0x03);
        assert_eq!(decode(&bytes, None), h);
    }

    #[test]
    fn type1_header_round_trip() {
        let previous = header(100, 400, 20, 1);
        let h = header(200, 32, 19, 1);
        let bytes = encode(&h, Some(&previous));
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[0] >> 6, 1);
        assert_eq!(decode(&bytes, Some(&previous)), h);
    }

    #[test]
    fn type2_header_round_trip() {
        let previous = header(100, 400, 20, 1);
        let h = header(200, 400, 20, 1);
        let bytes = encode(&h, Some(&previous));
        assert_eq!(bytes.len(), 4);
        assert_eq!(bytes[0] >> 6, 2);
        assert_eq!(decode(&bytes, Some(&previous)), h);
    }

    #[test]
    fn equal_header_encodes_to_one_byte() {
        let h = header(100, 400, 20, 1);
        let bytes = encode(&h, Some(&h));
        assert_eq!(bytes, vec![0xC3]);
        assert_eq!(decode(&bytes, Some(&h)), h);
    }

    #[test]
    fn different_stream_id_needs_a_full_header() {
        let previous = header(100, 400, 20, 1);
        let h = header(100, 400, 20, 2);
        let bytes = encode(&h, Some(&previous));
        assert_eq!(bytes[0] >> 6, 0);
        assert_eq!(decode(&bytes, Some(&previous)), h);
    }

    #[test]
    fn channel_mismatch_is_an_encode_error() {
        let previous = ChunkMessageCommonHeader {
            chunk_stream_id: 4,
            ..header(0, 0, 20, 0)
        };
        let mut writer = Writer::new();
        assert!(matches!(
            writer.write_header(&header(0, 0, 20, 0), Some(&previous)),
            Err(ChunkMessageError::ChunkStreamIdMismatch { previous: 4, new: 3 })
        ));
    }

    #[test]
    fn wide_csid_forms_round_trip() {
        for csid in [2, 63, 64, 319, 320, 65599] {
            let h = ChunkMessageCommonHeader {
                chunk_stream_id: csid,
                ..header(1, 2, 20, 3)
            };
            let bytes = encode(&h, None);
            assert_eq!(decode(&bytes, None), h);
        }
    }

    #[test]
    fn extended_timestamp_round_trip() {
        let h = header(0x0100_0000, 16, 20, 0);
        let bytes = encode(&h, None);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[1..4], &[0xFF, 0xFF, 0xFF]);
        assert_eq!(&bytes[12..], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(decode(&bytes, None), h);
    }

    #[test]
    fn fragmentation_is_transparent() {
        for chunk_size in [1u32, 128, 4096, 65536] {
            let message = RtmpMessage::Command(CommandMessage::new(vec![
                amf::amf0::Value::String("x".repeat(397)),
            ]));

            let mut writer = Writer::new();
            writer.set_chunk_size(chunk_size).unwrap();
            writer.write(&message).unwrap();

            let mut reader = Reader::new();
            reader.set_chunk_size(chunk_size).unwrap();
            let read_back = read_one_message(&mut reader, writer.buffer());

            assert_eq!(read_back.message, message, "chunk size {}", chunk_size);
            assert_eq!(read_back.header.message_length, 400);
        }
    }

    #[test]
    fn extended_timestamp_continuations_carry_the_echo_field() {
        let event_data = vec![7u8; 298];
        let body_length = 300u32;
        let h = ChunkMessageCommonHeader {
            chunk_stream_id: 2,
            timestamp: 0x0100_0000,
            message_length: body_length,
            message_type_id: 4,
            message_stream_id: 0,
        };

        let mut body = vec![0x00, 0x06]; // ping request
        body.extend_from_slice(&event_data);

        let mut writer = Writer::new();
        writer.write_with_header(&h, &body).unwrap();

        // full header with the extended field, then two continuations each
        // followed by the 4 byte echo
        let expected_length = (12 + 4) + 128 + (1 + 4) + 128 + (1 + 4) + 44;
        assert_eq!(writer.buffer().len(), expected_length);

        let message = read_one_message(&mut Reader::new(), writer.buffer());
        assert_eq!(message.header.timestamp, 0x0100_0000);
        assert_eq!(
            message.message,
            RtmpMessage::UserControl(UserControlMessage {
                event_type: UserControlEventType::PingRequest,
                event_data,
            })
        );
        assert!(message.header.timestamp >= MAX_TIMESTAMP);
    }

    #[test]
    fn continuation_must_be_type3() {
        let h = header(0, 300, 20, 0);
        let mut writer = Writer::new();
        writer.write_header(&h, None).unwrap();
        let mut bytes = writer.buffer().to_vec();
        bytes.extend_from_slice(&[0u8; 128]);
        // a second full header in the middle of the message
        let mut second = Writer::new();
        second.write_header(&h, None).unwrap();
        bytes.extend_from_slice(second.buffer());

        let mut reader = Reader::new();
        let mut buf = BytesMut::from(&bytes[..]);
        let mut cursor = Cursor::new(&buf);
        assert!(matches!(
            reader.read(&mut cursor),
            Err(ChunkMessageError::IncompleteChunk)
        ));
        let consumed = cursor.position() as usize;
        buf.advance(consumed);

        let mut cursor = Cursor::new(&buf);
        assert!(matches!(
            reader.read(&mut cursor),
            Err(ChunkMessageError::UnexpectedContinuationHeader(_))
        ));
    }

    #[test]
    fn compressed_header_without_context_is_rejected() {
        // a type 1 header on a chunk stream that never saw a type 0
        let bytes = [0x43, 0x00, 0x00, 0x01, 0x00, 0x00, 0x0A, 0x14];
        let mut reader = Reader::new();
        let buf = BytesMut::from(&bytes[..]);
        let mut cursor = Cursor::new(&buf);
        assert!(matches!(
            reader.read(&mut cursor),
            Err(ChunkMessageError::NeedContext(3))
        ));
    }

    #[test]
    fn chunk_size_bounds_are_enforced() {
        let mut reader = Reader::new();
        assert!(matches!(
            reader.set_chunk_size(0),
            Err(ChunkMessageError::InvalidChunkSize(0))
        ));
        assert!(matches!(
            reader.set_chunk_size(65537),
            Err(ChunkMessageError::InvalidChunkSize(65537))
        ));
        reader.set_chunk_size(65536).unwrap();
        assert_eq!(reader.chunk_size(), 65536);
    }
}
