use std::io;

use byteorder::{BigEndian, ReadBytesExt};

use super::{C0S0Packet, HandshakePacket, consts::RTMP_HANDSHAKE_PAYLOAD_SIZE, errors::HandshakeResult};

pub struct Reader<R> {
    inner: R,
}

impl<R> Reader<R>
where
    R: io::Read,
{
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_c0s0(&mut self) -> HandshakeResult<C0S0Packet> {
        let version = self.inner.read_u8()?;
        Ok(C0S0Packet { version })
    }

    pub fn read_packet(&mut self) -> HandshakeResult<HandshakePacket> {
        let first = self.inner.read_u32::<BigEndian>()?;
        let second = self.inner.read_u32::<BigEndian>()?;
        let mut payload = [0; RTMP_HANDSHAKE_PAYLOAD_SIZE];
        self.inner.read_exact(&mut payload)?;
        Ok(HandshakePacket {
            first,
            second,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use utils::traits::writer::WriteTo;

    use super::Reader;
    use crate::handshake::{C0S0Packet, HandshakePacket, consts::RTMP_HANDSHAKE_SIZE};

    #[test]
    fn version_byte_round_trips() {
        let mut bytes = Vec::new();
        C0S0Packet { version: 3 }.write_to(&mut bytes).unwrap();
        assert_eq!(bytes, vec![3]);
        assert_eq!(Reader::new(&bytes[..]).read_c0s0().unwrap().version, 3);
    }

    #[test]
    fn packets_round_trip() {
        let packet = HandshakePacket::fresh();
        let mut bytes = Vec::new();
        packet.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), RTMP_HANDSHAKE_SIZE);

        let read_back = Reader::new(&bytes[..]).read_packet().unwrap();
        assert_eq!(read_back.first, 0);
        assert_eq!(read_back.second, 0);
        assert_eq!(read_back.payload, packet.payload);
    }
}
