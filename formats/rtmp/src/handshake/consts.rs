pub const RTMP_VERSION: u8 = 3;
pub const RTMP_HANDSHAKE_SIZE: usize = 1536;
pub const RTMP_HANDSHAKE_PAYLOAD_SIZE: usize = RTMP_HANDSHAKE_SIZE - 8;
