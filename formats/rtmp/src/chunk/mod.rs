use errors::{ChunkMessageError, ChunkMessageResult};

use crate::message::RtmpMessage;

pub mod consts;
pub mod errors;
pub mod reader;
pub mod writer;

pub type Csid = u32;

///! @see: 5.3.1.1. Chunk Basic Header
///! 1, 2 or 3 bytes; the 2 fmt bits share the first byte with the
///! chunk stream id (csid 0 and 1 mark the 2 and 3 byte forms)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBasicHeader {
    pub fmt: u8, // 2 bits
    pub chunk_stream_id: Csid,
}

impl ChunkBasicHeader {
    pub fn new(fmt: u8, csid: Csid) -> ChunkMessageResult<Self> {
        if !(consts::MIN_CSID..=consts::MAX_CSID).contains(&csid) {
            return Err(ChunkMessageError::InvalidBasicHeader(format!(
                "invalid csid: {}",
                csid
            )));
        }
        Ok(Self {
            fmt,
            chunk_stream_id: csid,
        })
    }

    pub fn header_length(&self) -> usize {
        match self.chunk_stream_id {
            id if id < 64 => 1,
            id if id < 320 => 2,
            _ => 3,
        }
    }
}

///! @see: 5.3.1.2.1. Type 0 - full header, starts a chunk stream
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                   timestamp                   |message length |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     message length (cont)     |message type id| msg stream id |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           message stream id (cont)            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMessageHeaderType0 {
    pub timestamp: u32,         // 3 bytes, 0xFFFFFF enables the extended field
    pub message_length: u32,    // 3 bytes
    pub message_type_id: u8,    // 1 byte
    pub message_stream_id: u32, // 4 bytes, little endian
}

///! @see: 5.3.1.2.2. Type 1 - inherits the message stream id
///! 7 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMessageHeaderType1 {
    pub timestamp: u32,
    pub message_length: u32,
    pub message_type_id: u8,
}

///! @see: 5.3.1.2.3. Type 2 - only the timestamp differs from the
///! previous message on this chunk stream
///! 3 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMessageHeaderType2 {
    pub timestamp: u32,
}

///! @see: 5.3.1.2.4. Type 3 - no message header, everything is inherited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMessageHeaderType3 {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkMessageHeader {
    Type0(ChunkMessageHeaderType0),
    Type1(ChunkMessageHeaderType1),
    Type2(ChunkMessageHeaderType2),
    Type3(ChunkMessageHeaderType3),
}

impl ChunkMessageHeader {
    pub fn fmt(&self) -> u8 {
        match self {
            ChunkMessageHeader::Type0(_) => 0,
            ChunkMessageHeader::Type1(_) => 1,
            ChunkMessageHeader::Type2(_) => 2,
            ChunkMessageHeader::Type3(_) => 3,
        }
    }
}

/// A fully populated header, either decoded from a type 0 chunk or merged
/// with the previous header of the same chunk stream. This is what the
/// per-channel context maps hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMessageCommonHeader {
    pub chunk_stream_id: Csid,
    pub timestamp: u32,
    pub message_length: u32,
    pub message_type_id: u8,
    pub message_stream_id: u32,
}

impl ChunkMessageCommonHeader {
    /// Computes the smallest message header able to carry `self` after
    /// `previous` was sent on the same chunk stream.
    pub fn diff(
        &self,
        previous: Option<&ChunkMessageCommonHeader>,
    ) -> ChunkMessageResult<ChunkMessageHeader> {
        let Some(previous) = previous else {
            return Ok(ChunkMessageHeader::Type0(ChunkMessageHeaderType0 {
                timestamp: self.timestamp,
                message_length: self.message_length,
                message_type_id: self.message_type_id,
                message_stream_id: self.message_stream_id,
            }));
        };

        if previous.chunk_stream_id != self.chunk_stream_id {
            return Err(ChunkMessageError::ChunkStreamIdMismatch {
                previous: previous.chunk_stream_id,
                new: self.chunk_stream_id,
            });
        }

        if previous.message_stream_id != self.message_stream_id {
            return Ok(ChunkMessageHeader::Type0(ChunkMessageHeaderType0 {
                timestamp: self.timestamp,
                message_length: self.message_length,
                message_type_id: self.message_type_id,
                message_stream_id: self.message_stream_id,
            }));
        }

        if previous.message_type_id == self.message_type_id
            && previous.message_length == self.message_length
        {
            if previous.timestamp == self.timestamp {
                Ok(ChunkMessageHeader::Type3(ChunkMessageHeaderType3 {}))
            } else {
                Ok(ChunkMessageHeader::Type2(ChunkMessageHeaderType2 {
                    timestamp: self.timestamp,
                }))
            }
        } else {
            Ok(ChunkMessageHeader::Type1(ChunkMessageHeaderType1 {
                timestamp: self.timestamp,
                message_length: self.message_length,
                message_type_id: self.message_type_id,
            }))
        }
    }
}

///! @see: 5.3.1. Chunk Format
/// +--------------+----------------+--------------------+--------------+
/// | Basic Header | Message Header | Extended Timestamp |  Chunk Data  |
/// +--------------+----------------+--------------------+--------------+
/// |                                                    |
/// |<------------------- Chunk Header ----------------->|
#[derive(Debug)]
pub struct ChunkMessage {
    pub header: ChunkMessageCommonHeader,
    pub message: RtmpMessage,
}
