use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use utils::traits::writer::WriteTo;

use super::{
    C0S0Packet, HandshakePacket, HandshakeServerState,
    consts::{RTMP_HANDSHAKE_SIZE, RTMP_VERSION},
    errors::HandshakeResult,
};

#[derive(Debug)]
pub struct HandshakeServer<T> {
    io: T,
    state: HandshakeServerState,
}

impl<T> HandshakeServer<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(io: T) -> Self {
        Self {
            io,
            state: HandshakeServerState::Uninitialized,
        }
    }

    pub async fn handshake(&mut self) -> HandshakeResult<()> {
        loop {
            match self.state {
                HandshakeServerState::Uninitialized => {
                    // C0 version byte and C1 are read but not interpreted
                    self.io.read_u8().await?;
                    self.read_packet().await?;
                    self.state = HandshakeServerState::C0C1Received;
                    tracing::debug!("c0 and c1 read");
                }
                HandshakeServerState::C0C1Received => {
                    self.write_s0().await?;
                    self.write_packet().await?;
                    self.write_packet().await?;
                    self.io.flush().await?;
                    self.state = HandshakeServerState::S0S1S2Sent;
                    tracing::debug!("s0, s1 and s2 sent");
                }
                HandshakeServerState::S0S1S2Sent => {
                    self.read_packet().await?;
                    self.state = HandshakeServerState::Done;
                    tracing::debug!("c2 read, handshake done");
                }
                HandshakeServerState::Done => break,
            }
        }
        Ok(())
    }

    async fn write_s0(&mut self) -> HandshakeResult<()> {
        let mut bytes = Vec::with_capacity(1);
        C0S0Packet {
            version: RTMP_VERSION,
        }
        .write_to(&mut bytes)?;
        self.io.write_all(&bytes).await?;
        Ok(())
    }

    async fn write_packet(&mut self) -> HandshakeResult<()> {
        let mut bytes = Vec::with_capacity(RTMP_HANDSHAKE_SIZE);
        HandshakePacket::fresh().write_to(&mut bytes)?;
        self.io.write_all(&bytes).await?;
        Ok(())
    }

    async fn read_packet(&mut self) -> HandshakeResult<()> {
        let mut buf = [0; RTMP_HANDSHAKE_SIZE];
        self.io.read_exact(&mut buf).await?;
        Ok(())
    }
}
