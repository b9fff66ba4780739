use std::cmp::min;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use utils::traits::writer::WriteTo;

use super::{
    ChunkBasicHeader, ChunkMessageCommonHeader, ChunkMessageHeader,
    consts::{DEFAULT_CHUNK_SIZE, MAX_TIMESTAMP, csid},
    errors::{ChunkMessageError, ChunkMessageResult},
};
use crate::{
    message::RtmpMessage,
    protocol_control::consts::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE},
};

#[derive(Debug)]
pub struct Writer {
    inner: Vec<u8>,
    chunk_size: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            inner: Vec::with_capacity(4096),
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

    /// Serializes one message into the internal buffer with the framing the
    /// reference servers expect: control datatypes go to chunk stream 2,
    /// everything else to chunk stream 3, message stream 0, timestamp 0.
    pub fn write(&mut self, message: &RtmpMessage) -> ChunkMessageResult<()> {
        let mut body = Vec::with_capacity(4096);
        message.write_to(&mut body)?;

        let message_type_id: u8 = message.message_type().into();
        let chunk_stream_id = if (1..=7).contains(&message_type_id) {
            csid::PROTOCOL_CONTROL
        } else {
            csid::NET_CONNECTION_COMMAND
        };

        let header = ChunkMessageCommonHeader {
            chunk_stream_id,
            timestamp: 0,
            message_length: body.len() as u32,
            message_type_id,
            message_stream_id: 0,
        };
        self.write_with_header(&header, &body)
    }

    /// Emits a full type 0 header, then the body in `chunk_size` slices with
    /// a type 3 continuation header between every two of them.
    pub fn write_with_header(
        &mut self,
        header: &ChunkMessageCommonHeader,
        body: &[u8],
    ) -> ChunkMessageResult<()> {
        self.write_header(header, None)?;

        let mut offset = 0;
        loop {
            let end = min(offset + self.chunk_size, body.len());
            std::io::Write::write_all(&mut self.inner, &body[offset..end])?;
            offset = end;
            if offset >= body.len() {
                break;
            }
            self.write_header(header, Some(header))?;
        }
        Ok(())
    }

    /// Encodes the smallest header able to carry `header` after `previous`
    /// on the same chunk stream, a full type 0 header if there is none.
    pub fn write_header(
        &mut self,
        header: &ChunkMessageCommonHeader,
        previous: Option<&ChunkMessageCommonHeader>,
    ) -> ChunkMessageResult<()> {
        let message_header = header.diff(previous)?;
        let basic_header = ChunkBasicHeader::new(message_header.fmt(), header.chunk_stream_id)?;
        self.write_basic_header(&basic_header)?;
        self.write_message_header(&message_header)?;

        if matches!(message_header, ChunkMessageHeader::Type3(_))
            && header.timestamp >= MAX_TIMESTAMP
        {
            // continuation chunks echo the extended timestamp, see the
            // matching workaround in the reader
            WriteBytesExt::write_u32::<BigEndian>(&mut self.inner, header.timestamp)?;
        }
        Ok(())
    }

    fn write_basic_header(&mut self, header: &ChunkBasicHeader) -> ChunkMessageResult<()> {
        match header.chunk_stream_id {
            id if id < 64 => {
                WriteBytesExt::write_u8(&mut self.inner, (header.fmt << 6) | id as u8)?;
            }
            id if id < 320 => {
                WriteBytesExt::write_u8(&mut self.inner, header.fmt << 6)?;
                WriteBytesExt::write_u8(&mut self.inner, (id - 64) as u8)?;
            }
            // low byte first on the wire
            id => {
                WriteBytesExt::write_u8(&mut self.inner, (header.fmt << 6) | 1)?;
                WriteBytesExt::write_u8(&mut self.inner, ((id - 64) & 0xFF) as u8)?;
                WriteBytesExt::write_u8(&mut self.inner, ((id - 64) >> 8) as u8)?;
            }
        }
        Ok(())
    }

    fn write_message_header(&mut self, header: &ChunkMessageHeader) -> ChunkMessageResult<()> {
        match header {
            ChunkMessageHeader::Type0(header) => {
                self.inner
                    .write_u24::<BigEndian>(header.timestamp.min(MAX_TIMESTAMP))?;
                self.inner.write_u24::<BigEndian>(header.message_length)?;
                WriteBytesExt::write_u8(&mut self.inner, header.message_type_id)?;
                WriteBytesExt::write_u32::<LittleEndian>(
                    &mut self.inner,
                    header.message_stream_id,
                )?;
                if header.timestamp >= MAX_TIMESTAMP {
                    WriteBytesExt::write_u32::<BigEndian>(&mut self.inner, header.timestamp)?;
                }
            }
            ChunkMessageHeader::Type1(header) => {
                self.inner
                    .write_u24::<BigEndian>(header.timestamp.min(MAX_TIMESTAMP))?;
                self.inner.write_u24::<BigEndian>(header.message_length)?;
                WriteBytesExt::write_u8(&mut self.inner, header.message_type_id)?;
                if header.timestamp >= MAX_TIMESTAMP {
                    WriteBytesExt::write_u32::<BigEndian>(&mut self.inner, header.timestamp)?;
                }
            }
            ChunkMessageHeader::Type2(header) => {
                self.inner
                    .write_u24::<BigEndian>(header.timestamp.min(MAX_TIMESTAMP))?;
                if header.timestamp >= MAX_TIMESTAMP {
                    WriteBytesExt::write_u32::<BigEndian>(&mut self.inner, header.timestamp)?;
                }
            }
            ChunkMessageHeader::Type3(_) => {}
        }
        Ok(())
    }

    /// The serialized bytes not flushed yet.
    pub fn buffer(&self) -> &[u8] {
        &self.inner
    }

    pub async fn flush_to<W>(&mut self, writer: &mut W) -> ChunkMessageResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.inner).await?;
        self.inner.clear();
        Ok(())
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
