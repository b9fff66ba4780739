pub mod client;
pub mod consts;
pub mod errors;
pub mod reader;
pub mod server;
pub mod writer;

/// The single version byte exchanged as C0 and S0. Its content is not
/// interpreted on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C0S0Packet {
    pub version: u8,
}

/// C1, S1, C2 and S2 all share this 1536 byte layout. Nothing in it is
/// validated: both sides must tolerate arbitrary payloads, the client echoes
/// S1 back verbatim as C2 and ignores S2 entirely.
#[derive(Debug, Clone)]
pub struct HandshakePacket {
    pub first: u32,
    pub second: u32,
    pub payload: [u8; consts::RTMP_HANDSHAKE_PAYLOAD_SIZE],
}

impl HandshakePacket {
    /// A packet with zeroed leading words and an arbitrary payload.
    pub fn fresh() -> Self {
        let mut payload = [0; consts::RTMP_HANDSHAKE_PAYLOAD_SIZE];
        utils::random::random_fill(&mut payload);
        Self {
            first: 0,
            second: 0,
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeClientState {
    Uninitialized,
    C0C1Sent,
    AckSent,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeServerState {
    Uninitialized,
    C0C1Received,
    S0S1S2Sent,
    Done,
}
