use utils::traits::reader::{ReadFrom, ReadRemainingFrom};

use super::{RtmpMessage, RtmpMessageType};
use crate::{
    chunk::errors::ChunkMessageError,
    command::CommandMessage,
    protocol_control::{SetChunkSize, SetPeerBandwidth, WindowAckSize},
    shared_object::SharedObjectMessage,
    user_control::UserControlMessage,
};

impl<'a> ReadRemainingFrom<RtmpMessageType, &'a [u8]> for RtmpMessage {
    type Error = ChunkMessageError;
    fn read_remaining_from(
        header: RtmpMessageType,
        reader: &mut &'a [u8],
    ) -> Result<Self, Self::Error> {
        match header {
            RtmpMessageType::SetChunkSize => {
                Ok(RtmpMessage::SetChunkSize(SetChunkSize::read_from(reader)?))
            }
            RtmpMessageType::UserControl => Ok(RtmpMessage::UserControl(
                UserControlMessage::read_from(reader)?,
            )),
            RtmpMessageType::WindowAckSize => Ok(RtmpMessage::WindowAckSize(
                WindowAckSize::read_from(reader)?,
            )),
            RtmpMessageType::SetPeerBandwidth => Ok(RtmpMessage::SetPeerBandwidth(
                SetPeerBandwidth::read_from(reader)?,
            )),
            RtmpMessageType::SharedObject => Ok(RtmpMessage::SharedObject(
                SharedObjectMessage::read_from(reader)?,
            )),
            RtmpMessageType::Command => {
                Ok(RtmpMessage::Command(CommandMessage::read_from(reader)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use amf::{Pair, amf0::Value as Amf0Value};
    use utils::traits::{reader::ReadRemainingFrom, writer::WriteTo};

    use crate::{
        chunk::errors::ChunkMessageError,
        command::CommandMessage,
        message::{RtmpMessage, RtmpMessageType},
        protocol_control::{
            SetChunkSize, SetPeerBandwidth, SetPeerBandwidthLimitType, WindowAckSize,
        },
        user_control::{UserControlEventType, UserControlMessage},
    };

    fn round_trip(message: RtmpMessage) {
        let mut bytes = Vec::new();
        message.write_to(&mut bytes).unwrap();
        let read_back =
            RtmpMessage::read_remaining_from(message.message_type(), &mut &bytes[..]).unwrap();
        assert_eq!(read_back, message);
    }

    #[test]
    fn protocol_control_messages_round_trip() {
        round_trip(RtmpMessage::SetChunkSize(SetChunkSize { chunk_size: 4096 }));
        round_trip(RtmpMessage::WindowAckSize(WindowAckSize { size: 2_500_000 }));
        round_trip(RtmpMessage::SetPeerBandwidth(SetPeerBandwidth {
            size: 2_500_000,
            limit_type: SetPeerBandwidthLimitType::Dynamic,
        }));
    }

    #[test]
    fn user_control_keeps_the_payload_opaque() {
        round_trip(RtmpMessage::UserControl(UserControlMessage {
            event_type: UserControlEventType::PingRequest,
            event_data: vec![0, 0, 0, 5],
        }));
    }

    #[test]
    fn commands_round_trip_as_value_sequences() {
        round_trip(RtmpMessage::Command(CommandMessage::new(vec![
            Amf0Value::String("_result".to_owned()),
            Amf0Value::Number(1.0),
            Amf0Value::Object {
                class_name: None,
                entries: vec![Pair {
                    key: "code".to_owned(),
                    value: Amf0Value::String("NetConnection.Connect.Success".to_owned()),
                }],
            },
            Amf0Value::Null,
        ])));
    }

    #[test]
    fn connect_request_carries_the_player_properties() {
        let command = CommandMessage::connect_request("app", "tc", "page", "swf", Vec::new());
        assert_eq!(command.command_name(), Some("connect"));
        assert_eq!(command.transaction_id(), Some(1.0));

        let Some(Amf0Value::Object { entries, .. }) = command.values.get(2) else {
            panic!("connect is missing its command object");
        };
        let get = |key: &str| {
            entries
                .iter()
                .find(|pair| pair.key == key)
                .map(|pair| &pair.value)
        };
        assert_eq!(get("app"), Some(&Amf0Value::String("app".to_owned())));
        assert_eq!(get("tcUrl"), Some(&Amf0Value::String("tc".to_owned())));
        assert_eq!(get("videoCodecs"), Some(&Amf0Value::Number(252.0)));
        assert_eq!(get("audioCodecs"), Some(&Amf0Value::Number(3191.0)));
        assert_eq!(get("fpad"), Some(&Amf0Value::Boolean(false)));
        assert_eq!(get("objectEncoding"), Some(&Amf0Value::Number(0.0)));
    }

    #[test]
    fn connect_result_exposes_its_code() {
        let command = CommandMessage::connect_result(
            1.0,
            "FMS/3,0,2,217",
            31.0,
            "NetConnection.Connect.Success",
            "Connection succeeded.",
            "status",
        );
        assert!(command.is_result());
        assert_eq!(command.result_code(), Some("NetConnection.Connect.Success"));
    }

    #[test]
    fn unknown_datatypes_are_fatal() {
        assert!(matches!(
            RtmpMessageType::try_from(2),
            Err(ChunkMessageError::UnknownMessageType(2))
        ));
        assert!(matches!(
            RtmpMessageType::try_from(8),
            Err(ChunkMessageError::UnknownMessageType(8))
        ));
    }

    #[test]
    fn unknown_user_control_events_are_fatal() {
        let bytes = [0x00, 0xFF, 0x00];
        assert!(matches!(
            RtmpMessage::read_remaining_from(RtmpMessageType::UserControl, &mut &bytes[..]),
            Err(ChunkMessageError::UnknownEventType(255))
        ));
    }

    #[test]
    fn out_of_range_chunk_sizes_are_rejected() {
        let bytes = 0u32.to_be_bytes();
        assert!(matches!(
            RtmpMessage::read_remaining_from(RtmpMessageType::SetChunkSize, &mut &bytes[..]),
            Err(ChunkMessageError::InvalidChunkSize(0))
        ));

        let bytes = 65537u32.to_be_bytes();
        assert!(matches!(
            RtmpMessage::read_remaining_from(RtmpMessageType::SetChunkSize, &mut &bytes[..]),
            Err(ChunkMessageError::InvalidChunkSize(65537))
        ));
    }
}
