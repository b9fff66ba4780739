use std::io::{self, Cursor};

use amf::amf0::Value as Amf0Value;
use rtmp_formats::{
    chunk::{ChunkMessage, errors::ChunkMessageError, reader, writer},
    command::{CommandMessage, consts::response_code},
    handshake::client::HandshakeClient,
    message::RtmpMessage,
    user_control::{UserControlEventType, UserControlMessage},
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter},
    net::TcpStream,
};
use tokio_util::bytes::{Buf, BytesMut};

use crate::{
    config::RtmpClientConfig,
    consts::{CONNECT_TRANSACTION_ID, EXPECTED_STREAM_BEGIN_DATA, EXPECTED_WINDOW_ACK_SIZE},
    errors::{RtmpSessionError, RtmpSessionResult},
    shared_object::SharedObject,
};

/// Connects to a server and hands out an established session.
#[derive(Debug)]
pub struct RtmpClient {
    config: RtmpClientConfig,
}

impl RtmpClient {
    pub fn new(config: RtmpClientConfig) -> Self {
        Self { config }
    }

    /// Opens the TCP connection, performs the handshake, sends the connect
    /// command and absorbs everything up to the server's `_result`.
    pub async fn connect(
        self,
        params: Vec<Amf0Value>,
    ) -> RtmpSessionResult<ClientSession<TcpStream>> {
        let stream = TcpStream::connect((self.config.ip.as_str(), self.config.port)).await?;
        tracing::debug!(
            "tcp connection open, ip: {}, port: {}",
            self.config.ip,
            self.config.port
        );
        ClientSession::connect(stream, self.config, params).await
    }
}

/// One established client connection. The session owns its socket, chunk
/// reader and writer exclusively and processes messages strictly in wire
/// order on a single task.
#[derive(Debug)]
pub struct ClientSession<T> {
    io: BufWriter<T>,
    read_buffer: BytesMut,
    chunk_reader: reader::Reader,
    chunk_writer: writer::Writer,
    shared_objects: Vec<SharedObject>,
    config: RtmpClientConfig,
}

impl<T> ClientSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Runs the handshake and connect sequence over an already open
    /// transport.
    pub async fn connect(
        io: T,
        config: RtmpClientConfig,
        params: Vec<Amf0Value>,
    ) -> RtmpSessionResult<Self> {
        let mut io = BufWriter::new(io);
        HandshakeClient::new(&mut io).handshake().await?;

        let mut session = Self {
            io,
            read_buffer: BytesMut::with_capacity(4096),
            chunk_reader: reader::Reader::new(),
            chunk_writer: writer::Writer::new(),
            shared_objects: Vec::new(),
            config,
        };
        session.connect_rtmp(params).await?;
        Ok(session)
    }

    async fn connect_rtmp(&mut self, params: Vec<Amf0Value>) -> RtmpSessionResult<()> {
        let command = CommandMessage::connect_request(
            &self.config.app,
            &self.config.tc_url,
            &self.config.page_url,
            &self.config.swf_url,
            params,
        );
        self.write_message(&RtmpMessage::Command(command)).await?;

        loop {
            let Some(message) = self.read_message().await? else {
                return Err(RtmpSessionError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before connect completed",
                )));
            };
            if self.handle_message_pre_connect(message)? {
                return Ok(());
            }
        }
    }

    /// The strict policy for everything a server may send before its
    /// `_result`. Returns true once the connect is acknowledged.
    fn handle_message_pre_connect(&mut self, message: ChunkMessage) -> RtmpSessionResult<bool> {
        match message.message {
            RtmpMessage::Command(command) => {
                if !command.is_result()
                    || command.transaction_id() != Some(CONNECT_TRANSACTION_ID)
                    || command.result_code() != Some(response_code::NET_CONNECTION_CONNECT_SUCCESS)
                {
                    return Err(RtmpSessionError::UnexpectedPreConnectMessage(format!(
                        "expect a _result with {}, got: {:?}",
                        response_code::NET_CONNECTION_CONNECT_SUCCESS,
                        command
                    )));
                }
                tracing::debug!("connect accepted by server");
                Ok(true)
            }
            RtmpMessage::WindowAckSize(message) => {
                if message.size != EXPECTED_WINDOW_ACK_SIZE {
                    return Err(RtmpSessionError::UnexpectedPreConnectMessage(format!(
                        "expect window ack size {}, got {}",
                        EXPECTED_WINDOW_ACK_SIZE, message.size
                    )));
                }
                Ok(false)
            }
            RtmpMessage::SetPeerBandwidth(message) => {
                if message.size != EXPECTED_WINDOW_ACK_SIZE
                    || message.limit_type
                        != rtmp_formats::protocol_control::SetPeerBandwidthLimitType::Dynamic
                {
                    return Err(RtmpSessionError::UnexpectedPreConnectMessage(format!(
                        "unexpected set peer bandwidth: {:?}",
                        message
                    )));
                }
                Ok(false)
            }
            RtmpMessage::UserControl(message) => {
                if message.event_type != UserControlEventType::StreamBegin
                    || message.event_data != EXPECTED_STREAM_BEGIN_DATA
                {
                    return Err(RtmpSessionError::UnexpectedPreConnectMessage(format!(
                        "expect stream begin on stream 0, got: {:?}",
                        message
                    )));
                }
                Ok(false)
            }
            RtmpMessage::SetChunkSize(message) => {
                self.chunk_reader.set_chunk_size(message.chunk_size)?;
                tracing::debug!("inbound chunk size is now {}", message.chunk_size);
                Ok(false)
            }
            other => Err(RtmpSessionError::UnexpectedPreConnectMessage(format!(
                "{:?}",
                other
            ))),
        }
    }

    /// The post-connect dispatch loop. Returns once the peer closes the
    /// connection at a message boundary.
    pub async fn run(&mut self) -> RtmpSessionResult<()> {
        while let Some(message) = self.read_message().await? {
            self.dispatch(message).await?;
        }
        tracing::debug!("peer closed the connection, session done");
        Ok(())
    }

    async fn dispatch(&mut self, message: ChunkMessage) -> RtmpSessionResult<()> {
        if self.handle_simple_message(&message).await? {
            return Ok(());
        }

        if let RtmpMessage::SharedObject(so_message) = &message.message {
            for shared_object in self.shared_objects.iter_mut() {
                if shared_object.handle_message(so_message)? {
                    return Ok(());
                }
            }
        }

        Err(RtmpSessionError::UnexpectedMessage(format!(
            "{:?}",
            message.message
        )))
    }

    /// Answers ping requests in place, everything else falls through.
    async fn handle_simple_message(&mut self, message: &ChunkMessage) -> RtmpSessionResult<bool> {
        if let RtmpMessage::UserControl(event) = &message.message
            && event.event_type == UserControlEventType::PingRequest
        {
            let response = UserControlMessage {
                event_type: UserControlEventType::PingResponse,
                event_data: event.event_data.clone(),
            };
            self.write_message(&RtmpMessage::UserControl(response))
                .await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Starts receiving updates for a shared object and tracks it. Using a
    /// name that is already tracked is a no-op.
    pub async fn shared_object_use(&mut self, mut so: SharedObject) -> RtmpSessionResult<()> {
        if self
            .shared_objects
            .iter()
            .any(|tracked| tracked.name() == so.name())
        {
            return Ok(());
        }

        let message = so.use_request();
        self.write_message(&RtmpMessage::SharedObject(message))
            .await?;
        self.shared_objects.push(so);
        Ok(())
    }

    /// Fires a remote procedure call. No response correlation is performed.
    pub async fn call(
        &mut self,
        parameters: Amf0Value,
        transaction_id: f64,
    ) -> RtmpSessionResult<()> {
        let command = CommandMessage::call_request(transaction_id, parameters);
        self.write_message(&RtmpMessage::Command(command)).await
    }

    pub fn shared_objects(&self) -> &[SharedObject] {
        &self.shared_objects
    }

    /// The chunk size the server negotiated for its direction.
    pub fn inbound_chunk_size(&self) -> usize {
        self.chunk_reader.chunk_size()
    }

    async fn write_message(&mut self, message: &RtmpMessage) -> RtmpSessionResult<()> {
        self.chunk_writer.write(message)?;
        self.chunk_writer.flush_to(&mut self.io).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Reads the next whole message. `Ok(None)` is a clean end of stream at
    /// a message boundary; running dry in the middle of one is an error.
    async fn read_message(&mut self) -> RtmpSessionResult<Option<ChunkMessage>> {
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

            let len = self.io.read_buf(&mut self.read_buffer).await?;
            if len == 0 {
                if self.read_buffer.is_empty() {
                    return Ok(None);
                }
                return Err(RtmpSessionError::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )));
            }
        }
    }
}
