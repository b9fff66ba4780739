use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use utils::traits::writer::WriteTo;

use super::{
    C0S0Packet, HandshakeClientState, HandshakePacket,
    consts::{RTMP_HANDSHAKE_SIZE, RTMP_VERSION},
    errors::HandshakeResult,
    reader::Reader,
};

#[derive(Debug)]
pub struct HandshakeClient<T> {
    io: T,
    state: HandshakeClientState,
}

impl<T> HandshakeClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(io: T) -> Self {
        Self {
            io,
            state: HandshakeClientState::Uninitialized,
        }
    }

    pub async fn handshake(&mut self) -> HandshakeResult<()> {
        loop {
            match self.state {
                HandshakeClientState::Uninitialized => {
                    self.write_c0().await?;
                    self.write_c1().await?;
                    self.io.flush().await?;
                    self.state = HandshakeClientState::C0C1Sent;
                    tracing::debug!("c0 and c1 sent");
                }
                HandshakeClientState::C0C1Sent => {
                    // the version byte is not interpreted
                    self.io.read_u8().await?;
                    let s1 = self.read_packet().await?;
                    self.write_c2(s1).await?;
                    self.io.flush().await?;
                    self.state = HandshakeClientState::AckSent;
                    tracing::debug!("s0 and s1 read, c2 sent");
                }
                HandshakeClientState::AckSent => {
                    self.read_packet().await?;
                    self.state = HandshakeClientState::Done;
                    tracing::debug!("s2 read, handshake done");
                }
                HandshakeClientState::Done => break,
            }
        }
        Ok(())
    }

    async fn write_c0(&mut self) -> HandshakeResult<()> {
        let mut bytes = Vec::with_capacity(1);
        C0S0Packet {
            version: RTMP_VERSION,
        }
        .write_to(&mut bytes)?;
        self.io.write_all(&bytes).await?;
        Ok(())
    }

    async fn write_c1(&mut self) -> HandshakeResult<()> {
        let mut bytes = Vec::with_capacity(RTMP_HANDSHAKE_SIZE);
        HandshakePacket::fresh().write_to(&mut bytes)?;
        self.io.write_all(&bytes).await?;
        Ok(())
    }

    /// C2 echoes S1 verbatim.
    async fn write_c2(&mut self, s1: HandshakePacket) -> HandshakeResult<()> {
        let mut bytes = Vec::with_capacity(RTMP_HANDSHAKE_SIZE);
        s1.write_to(&mut bytes)?;
        self.io.write_all(&bytes).await?;
        Ok(())
    }

    async fn read_packet(&mut self) -> HandshakeResult<HandshakePacket> {
        let mut buf = [0; RTMP_HANDSHAKE_SIZE];
        self.io.read_exact(&mut buf).await?;
        Reader::new(&buf[..]).read_packet()
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    use super::HandshakeClient;
    use crate::handshake::consts::{RTMP_HANDSHAKE_SIZE, RTMP_VERSION};

    #[tokio::test]
    async fn client_sends_c0_c1_up_front_and_echoes_s1() {
        let (mut client_end, mut peer) = duplex(16 * 1024);
        let client = tokio::spawn(async move {
            HandshakeClient::new(&mut client_end)
                .handshake()
                .await
                .unwrap();
        });

        // C0 and C1 arrive before the peer has written a single byte
        let mut c0 = [0u8; 1];
        peer.read_exact(&mut c0).await.unwrap();
        assert_eq!(c0[0], RTMP_VERSION);
        let mut c1 = [0u8; RTMP_HANDSHAKE_SIZE];
        peer.read_exact(&mut c1).await.unwrap();
        assert_eq!(&c1[..8], &[0u8; 8]);

        let mut s1 = [7u8; RTMP_HANDSHAKE_SIZE];
        s1[11] = 42;
        peer.write_all(&[RTMP_VERSION]).await.unwrap();
        peer.write_all(&s1).await.unwrap();
        // echo C1 back as S2, its content must not matter
        peer.write_all(&c1).await.unwrap();

        let mut c2 = [0u8; RTMP_HANDSHAKE_SIZE];
        peer.read_exact(&mut c2).await.unwrap();
        assert_eq!(c2, s1);

        client.await.unwrap();
    }
}
