use std::io;
use std::io::Read;

use amf::{Pair, amf0::Value as Amf0Value};
use byteorder::{BigEndian, ReadBytesExt};
use utils::traits::reader::ReadFrom;

use super::{SharedObjectEvent, SharedObjectEventType, SharedObjectMessage};
use crate::chunk::errors::{ChunkMessageError, ChunkMessageResult};

impl<'a> ReadFrom<&'a [u8]> for SharedObjectMessage {
    type Error = ChunkMessageError;
    fn read_from(reader: &mut &'a [u8]) -> Result<Self, Self::Error> {
        let name = read_utf8(reader)?;
        let version = reader.read_u32::<BigEndian>()?;
        let mut flags = [0; super::SHARED_OBJECT_FLAGS_LENGTH];
        reader.read_exact(&mut flags)?;

        let mut events = Vec::new();
        while !reader.is_empty() {
            events.push(read_event(reader)?);
        }

        Ok(SharedObjectMessage {
            name,
            version,
            flags,
            events,
        })
    }
}

fn read_event(reader: &mut &[u8]) -> ChunkMessageResult<SharedObjectEvent> {
    let event_type = reader.read_u8()?;
    let payload_size = reader.read_u32::<BigEndian>()?;

    let size = payload_size as usize;
    if reader.len() < size {
        return Err(ChunkMessageError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "shared object event payload truncated",
        )));
    }
    let (mut payload, rest) = reader.split_at(size);
    *reader = rest;

    match SharedObjectEventType::try_from(event_type)? {
        SharedObjectEventType::Use => {
            expect_empty_payload(event_type, payload_size)?;
            Ok(SharedObjectEvent::Use)
        }
        SharedObjectEventType::Release => {
            expect_empty_payload(event_type, payload_size)?;
            Ok(SharedObjectEvent::Release)
        }
        SharedObjectEventType::Change => {
            let mut entries: Vec<Pair<String, Amf0Value>> = Vec::new();
            while !payload.is_empty() {
                let key = read_utf8(&mut payload)?;
                let value = Amf0Value::read_from(&mut payload)?;
                if entries.iter().any(|pair| pair.key == key) {
                    return Err(ChunkMessageError::DuplicateEventKey(key));
                }
                entries.push(Pair { key, value });
            }
            Ok(SharedObjectEvent::Change(entries))
        }
        SharedObjectEventType::Message => {
            let mut arguments = Vec::new();
            while !payload.is_empty() {
                arguments.push(Amf0Value::read_from(&mut payload)?);
            }
            Ok(SharedObjectEvent::Message(arguments))
        }
        SharedObjectEventType::Clear => {
            expect_empty_payload(event_type, payload_size)?;
            Ok(SharedObjectEvent::Clear)
        }
        SharedObjectEventType::Delete => {
            let key = read_utf8(&mut payload)?;
            if !payload.is_empty() {
                return Err(ChunkMessageError::EventPayloadSizeMismatch {
                    declared: payload_size,
                    consumed: size - payload.len(),
                });
            }
            Ok(SharedObjectEvent::Delete(key))
        }
        SharedObjectEventType::UseSuccess => {
            expect_empty_payload(event_type, payload_size)?;
            Ok(SharedObjectEvent::UseSuccess)
        }
    }
}

fn expect_empty_payload(event_type: u8, size: u32) -> ChunkMessageResult<()> {
    if size != 0 {
        return Err(ChunkMessageError::NonEmptyEventPayload { event_type, size });
    }
    Ok(())
}

/// Bare AMF0 UTF-8 string, a u16 length prefix with no type marker.
fn read_utf8(reader: &mut &[u8]) -> ChunkMessageResult<String> {
    let length = reader.read_u16::<BigEndian>()? as usize;
    let mut bytes = vec![0; length];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|err| {
        ChunkMessageError::UnexpectedAmfType(format!("invalid utf8 in shared object string: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use amf::{Pair, amf0::Value as Amf0Value};
    use byteorder::{BigEndian, ReadBytesExt};
    use utils::traits::{reader::ReadFrom, writer::WriteTo};

    use crate::{
        chunk::errors::ChunkMessageError,
        shared_object::{SharedObjectEvent, SharedObjectMessage},
    };

    fn encode(message: &SharedObjectMessage) -> Vec<u8> {
        let mut bytes = Vec::new();
        message.write_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn every_event_type_round_trips() {
        let message = SharedObjectMessage::new(
            "room",
            vec![
                SharedObjectEvent::Use,
                SharedObjectEvent::Release,
                SharedObjectEvent::Change(vec![
                    Pair {
                        key: "sparam".to_owned(),
                        value: Amf0Value::String("hi".to_owned()),
                    },
                    Pair {
                        key: "count".to_owned(),
                        value: Amf0Value::Number(2.0),
                    },
                ]),
                SharedObjectEvent::Message(vec![
                    Amf0Value::String("chat".to_owned()),
                    Amf0Value::Number(1.0),
                ]),
                SharedObjectEvent::Clear,
                SharedObjectEvent::Delete("sparam".to_owned()),
                SharedObjectEvent::UseSuccess,
            ],
        );

        let bytes = encode(&message);
        let read_back = SharedObjectMessage::read_from(&mut &bytes[..]).unwrap();
        assert_eq!(read_back, message);
    }

    #[test]
    fn declared_event_sizes_match_written_bytes() {
        let message = SharedObjectMessage::new(
            "room",
            vec![
                SharedObjectEvent::UseSuccess,
                SharedObjectEvent::Change(vec![Pair {
                    key: "k".to_owned(),
                    value: Amf0Value::Boolean(true),
                }]),
                SharedObjectEvent::Delete("k".to_owned()),
            ],
        );

        let bytes = encode(&message);
        let mut rest = &bytes[..];

        // skip name, version and flags
        let name_length = rest.read_u16::<BigEndian>().unwrap() as usize;
        rest = &rest[name_length..];
        rest = &rest[4 + 8..];

        let mut events = 0;
        while !rest.is_empty() {
            rest.read_u8().unwrap();
            let size = rest.read_u32::<BigEndian>().unwrap() as usize;
            assert!(rest.len() >= size, "event claims more bytes than written");
            rest = &rest[size..];
            events += 1;
        }
        assert_eq!(events, 3);
    }

    #[test]
    fn use_request_carries_a_single_use_event() {
        let message = SharedObjectMessage::use_request("room");
        assert_eq!(message.name, "room");
        assert_eq!(message.version, 0);
        assert_eq!(message.flags, [0; 8]);
        assert_eq!(message.events, vec![SharedObjectEvent::Use]);
    }

    #[test]
    fn zero_payload_events_must_be_empty() {
        // a use event claiming one payload byte
        let bytes = [0x00, 0x04, b'r', b'o', b'o', b'm', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0,
            0, 0, 1, 0xFF];
        assert!(matches!(
            SharedObjectMessage::read_from(&mut &bytes[..]),
            Err(ChunkMessageError::NonEmptyEventPayload {
                event_type: 1,
                size: 1
            })
        ));
    }

    #[test]
    fn duplicate_change_keys_are_rejected() {
        let message = SharedObjectMessage::new(
            "room",
            vec![SharedObjectEvent::Change(vec![
                Pair {
                    key: "k".to_owned(),
                    value: Amf0Value::Number(1.0),
                },
                Pair {
                    key: "k".to_owned(),
                    value: Amf0Value::Number(2.0),
                },
            ])],
        );
        let bytes = encode(&message);
        assert!(matches!(
            SharedObjectMessage::read_from(&mut &bytes[..]),
            Err(ChunkMessageError::DuplicateEventKey(key)) if key == "k"
        ));
    }

    #[test]
    fn unknown_event_types_are_fatal() {
        let bytes = [0x00, 0x01, b'r', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0];
        assert!(matches!(
            SharedObjectMessage::read_from(&mut &bytes[..]),
            Err(ChunkMessageError::UnknownSharedObjectEventType(3))
        ));
    }

    #[test]
    fn delete_payload_must_hold_exactly_one_key() {
        // delete event with a trailing byte after the key
        let payload = [0x00, 0x01, b'k', 0xAA];
        let mut bytes = vec![0x00, 0x01, b'r', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        bytes.push(9);
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&payload);
        assert!(matches!(
            SharedObjectMessage::read_from(&mut &bytes[..]),
            Err(ChunkMessageError::EventPayloadSizeMismatch {
                declared: 4,
                consumed: 3
            })
        ));
    }
}
