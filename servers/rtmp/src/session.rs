use core::time;
use std::io::{self, Cursor};

use rtmp_formats::{
    chunk::{ChunkMessage, errors::ChunkMessageError, reader, writer},
    command::{
        CommandMessage,
        consts::{c2s_command_names, response_code, response_level},
    },
    handshake::server::HandshakeServer,
    message::RtmpMessage,
    user_control::{UserControlEventType, UserControlMessage},
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter},
    time::timeout,
};
use tokio_util::bytes::{Buf, BytesMut};

use super::{
    config::RtmpSessionConfig,
    consts::{CONNECT_DESCRIPTION, FMS_CAPABILITIES, FMSVER},
    errors::{RtmpServerError, RtmpServerResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServerSessionState {
    WaitingConnect,
    Established,
}

/// One server side connection. After the handshake the session expects
/// exactly one connect command, answers it with a `_result`, and from then
/// on yields messages to the embedding application.
#[derive(Debug)]
pub struct ServerSession<T> {
    io: BufWriter<T>,
    read_buffer: BytesMut,
    chunk_reader: reader::Reader,
    chunk_writer: writer::Writer,
    config: RtmpSessionConfig,
    state: ServerSessionState,
}

impl<T> ServerSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(io: T, config: RtmpSessionConfig) -> Self {
        Self {
            io: BufWriter::new(io),
            read_buffer: BytesMut::with_capacity(4096),
            chunk_reader: reader::Reader::new(),
            chunk_writer: writer::Writer::new(),
            config,
            state: ServerSessionState::WaitingConnect,
        }
    }

    /// Handshake, then the connect exchange.
    pub async fn run_until_connected(&mut self) -> RtmpServerResult<()> {
        HandshakeServer::new(&mut self.io).handshake().await?;
        self.handle_command_connect().await?;
        self.state = ServerSessionState::Established;
        Ok(())
    }

    async fn handle_command_connect(&mut self) -> RtmpServerResult<()> {
        let Some(message) = self.read_message().await? else {
            return Err(RtmpServerError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before the connect command",
            )));
        };

        match message.message {
            RtmpMessage::Command(command)
                if command.command_name() == Some(c2s_command_names::CONNECT) =>
            {
                tracing::debug!("connect received: {:?}", command);
                let result = CommandMessage::connect_result(
                    command.transaction_id().unwrap_or(1.0),
                    FMSVER,
                    FMS_CAPABILITIES,
                    response_code::NET_CONNECTION_CONNECT_SUCCESS,
                    CONNECT_DESCRIPTION,
                    response_level::STATUS,
                );
                self.write_message(&RtmpMessage::Command(result)).await
            }
            other => Err(RtmpServerError::UnexpectedMessage(format!(
                "expect a connect command, got: {:?}",
                other
            ))),
        }
    }

    /// Drives the established session: ping requests are answered in place,
    /// every other message goes to `handler`. Returns when the client closes
    /// the connection at a message boundary.
    pub async fn serve<F>(&mut self, mut handler: F) -> RtmpServerResult<()>
    where
        F: FnMut(ChunkMessage) -> RtmpServerResult<()>,
    {
        debug_assert!(self.state == ServerSessionState::Established);
        while let Some(message) = self.read_message().await? {
            if let RtmpMessage::UserControl(event) = &message.message
                && event.event_type == UserControlEventType::PingRequest
            {
                let response = UserControlMessage {
                    event_type: UserControlEventType::PingResponse,
                    event_data: event.event_data.clone(),
                };
                self.write_message(&RtmpMessage::UserControl(response))
                    .await?;
                continue;
            }
            handler(message)?;
        }
        Ok(())
    }

    pub async fn write_message(&mut self, message: &RtmpMessage) -> RtmpServerResult<()> {
        self.chunk_writer.write(message)?;
        timeout(
            time::Duration::from_millis(self.config.write_timeout_ms),
            async {
                self.chunk_writer.flush_to(&mut self.io).await?;
                self.io.flush().await?;
                Ok::<(), RtmpServerError>(())
            },
        )
        .await
        .map_err(|err| {
            RtmpServerError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("write message timeout: {}", err),
            ))
        })??;
        Ok(())
    }

    /// Reads the next whole message. `Ok(None)` is a clean end of stream at
    /// a message boundary; running dry in the middle of one is an error.
    pub async fn read_message(&mut self) -> RtmpServerResult<Option<ChunkMessage>> {
        loop {
            let mut buf = Cursor::new(&self.read_buffer);
            match self.chunk_reader.read(&mut buf) {
                Ok(Some(message)) => {
                    let consumed = buf.position() as usize;
                    self.read_buffer.advance(consumed);
                    return Ok(Some(message));
                }
                Ok(None) => {}
                Err(ChunkMessageError::IncompleteChunk) => {
                    self.read_buffer.advance(buf.position() as usize);
                    continue;
                }
                Err(err) => return Err(err.into()),
            }

            let len = timeout(
                time::Duration::from_millis(self.config.read_timeout_ms),
                self.io.read_buf(&mut self.read_buffer),
            )
            .await
            .map_err(|err| {
                RtmpServerError::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("read message timeout: {}", err),
                ))
            })??;

            if len == 0 {
                if self.read_buffer.is_empty() {
                    return Ok(None);
                }
                return Err(RtmpServerError::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )));
            }
        }
    }
}
