use crate::error::{MqttError, Result};
use crate::protocol::ControlPacketType;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

// Largest step by which a field buffer grows ahead of the data received.
const READ_CHUNK: usize = 8 * 1024;

/// The body of one packet: a reader bounded to the fixed header's Remaining Length.
///
/// Every read is a full read, and no read may cross the declared length, so a
/// decoder can never consume bytes that belong to the next packet.
pub struct PacketBody<'a> {
    read_stream: &'a mut (dyn AsyncRead + Unpin + Send),
    packet_type: ControlPacketType,
    declared: usize,
    consumed: usize,
}

impl<'a> PacketBody<'a> {
    pub fn new(
        read_stream: &'a mut (dyn AsyncRead + Unpin + Send),
        packet_type: ControlPacketType,
        declared: usize,
    ) -> Self {
        PacketBody {
            read_stream,
            packet_type,
            declared,
            consumed: 0,
        }
    }

    pub fn packet_type(&self) -> ControlPacketType {
        self.packet_type
    }

    /// Remaining Length announced by the fixed header.
    pub fn declared(&self) -> usize {
        self.declared
    }

    /// Bytes taken by completed reads so far. A read that fails is not counted.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes still owed before the body is complete.
    pub fn remaining(&self) -> usize {
        self.declared - self.consumed
    }

    fn check_bounds(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(MqttError::PayloadLengthMismatch {
                packet_type: self.packet_type,
                declared: self.declared,
                actual: self.consumed + len,
            });
        }
        Ok(())
    }

    pub async fn read_u8(&mut self) -> Result<u8> {
        self.check_bounds(1)?;
        let packet_type = self.packet_type;
        let value = self
            .read_stream
            .read_u8()
            .await
            .map_err(|e| MqttError::from(e).in_packet(packet_type))?;
        self.consumed += 1;
        Ok(value)
    }

    /// Reads a 2-byte big-endian integer.
    pub async fn read_u16(&mut self) -> Result<u16> {
        self.check_bounds(2)?;
        let packet_type = self.packet_type;
        let value = self
            .read_stream
            .read_u16()
            .await
            .map_err(|e| MqttError::from(e).in_packet(packet_type))?;
        self.consumed += 2;
        Ok(value)
    }

    /// Reads exactly `len` raw bytes.
    ///
    /// The buffer grows with the bytes that actually arrive, so a large declared
    /// length costs nothing until the peer sends the data.
    pub async fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.check_bounds(len)?;
        let packet_type = self.packet_type;

        let mut buf = BytesMut::with_capacity(len.min(READ_CHUNK));
        while buf.len() < len {
            let start = buf.len();
            buf.resize(start + (len - start).min(READ_CHUNK), 0);
            self.read_stream
                .read_exact(&mut buf[start..])
                .await
                .map_err(|e| MqttError::from(e).in_packet(packet_type))?;
        }

        self.consumed += len;
        Ok(buf.freeze())
    }

    /// Reads a 2-byte length prefix followed by that many raw bytes.
    pub async fn read_binary(&mut self) -> Result<Bytes> {
        let len = self.read_u16().await? as usize;
        self.read_bytes(len).await
    }

    /// Reads a length-prefixed UTF-8 string.
    pub async fn read_string(&mut self) -> Result<String> {
        let data = self.read_binary().await?;
        let s = std::str::from_utf8(&data).map_err(|source| MqttError::InvalidEncoding {
            packet_type: Some(self.packet_type),
            source,
        })?;
        Ok(s.to_owned())
    }

    /// Reads whatever is left of the body.
    pub async fn read_to_end(&mut self) -> Result<Bytes> {
        let len = self.remaining();
        self.read_bytes(len).await
    }

    /// Checks that the body was consumed exactly.
    pub fn finish(&self) -> Result<()> {
        if self.consumed != self.declared {
            return Err(MqttError::PayloadLengthMismatch {
                packet_type: self.packet_type,
                declared: self.declared,
                actual: self.consumed,
            });
        }
        Ok(())
    }
}
