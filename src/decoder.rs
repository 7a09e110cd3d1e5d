use crate::error::{MqttError, Result};
use crate::packet::fixed_header_from_first_byte;
use crate::packet::FixedHeader;
use crate::packets::*;
use crate::protocol::{ControlPacketType, MAX_REMAINING_LENGTH};
use crate::reader::PacketBody;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

/// Decodes the variable header and payload of one packet type.
///
/// The fixed header has already been consumed; `body` is bounded to its
/// Remaining Length and the decoder must consume all of it.
#[async_trait]
pub trait PacketDecoder: Send + Sync {
    async fn decode(&self, fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<ControlPacket>;
}

/// Configuration for a [`Decoder`].
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    max_packet_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig::new()
    }
}

impl DecoderConfig {
    /// Creates a configuration accepting any packet the protocol can express.
    pub fn new() -> Self {
        DecoderConfig {
            max_packet_size: MAX_REMAINING_LENGTH,
        }
    }

    /// Sets the largest Remaining Length accepted before the body is read.
    pub fn with_max_packet_size(mut self, max_packet_size: usize) -> Self {
        self.max_packet_size = max_packet_size;
        self
    }

    pub fn max_packet_size(&self) -> usize {
        self.max_packet_size
    }
}

/// The built-in decoder for a packet type.
pub fn default_decoder(packet_type: ControlPacketType) -> Arc<dyn PacketDecoder> {
    match packet_type {
        ControlPacketType::Connect => Arc::new(ConnectDecoder::new()),
        ControlPacketType::Connack => Arc::new(ConnackDecoder),
        ControlPacketType::Publish => Arc::new(PublishDecoder),
        ControlPacketType::Puback
        | ControlPacketType::Pubrec
        | ControlPacketType::Pubrel
        | ControlPacketType::Pubcomp
        | ControlPacketType::Unsuback => Arc::new(PacketIdDecoder),
        ControlPacketType::Subscribe => Arc::new(SubscribeDecoder),
        ControlPacketType::Suback => Arc::new(SubackDecoder),
        ControlPacketType::Unsubscribe => Arc::new(UnsubscribeDecoder),
        ControlPacketType::Pingreq | ControlPacketType::Pingresp | ControlPacketType::Disconnect => {
            Arc::new(EmptyBodyDecoder)
        }
    }
}

/// Reads MQTT packets one at a time from a byte stream.
///
/// One decoder owns one stream. Each call consumes exactly one packet or fails;
/// after an error the stream position is undefined and the connection should be
/// closed.
pub struct Decoder<R> {
    read_stream: R,
    config: DecoderConfig,
    decoders: HashMap<ControlPacketType, Arc<dyn PacketDecoder>>,
    position: u64,
}

impl<R: AsyncRead + Unpin + Send> Decoder<R> {
    /// Creates a decoder with the built-in decoders for all packet types.
    pub fn new(read_stream: R) -> Self {
        Decoder::with_config(read_stream, DecoderConfig::default())
    }

    pub fn with_config(read_stream: R, config: DecoderConfig) -> Self {
        let decoders = ControlPacketType::ALL
            .iter()
            .map(|packet_type| (*packet_type, default_decoder(*packet_type)))
            .collect();
        Decoder {
            read_stream,
            config,
            decoders,
            position: 0,
        }
    }

    /// Registers a decoder for a packet type, returning the one it replaces.
    pub fn register<D>(&mut self, packet_type: ControlPacketType, decoder: D) -> Option<Arc<dyn PacketDecoder>>
    where
        D: PacketDecoder + 'static,
    {
        self.decoders.insert(packet_type, Arc::new(decoder))
    }

    /// Removes the decoder for a packet type. Packets of that type then fail with
    /// `NotImplemented`.
    pub fn unregister(&mut self, packet_type: ControlPacketType) -> Option<Arc<dyn PacketDecoder>> {
        self.decoders.remove(&packet_type)
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Stream offset right after the last successfully decoded packet.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn get_ref(&self) -> &R {
        &self.read_stream
    }

    pub fn into_inner(self) -> R {
        self.read_stream
    }

    /// Decodes the next packet, or returns `None` if the stream ended cleanly
    /// before its first byte.
    pub async fn next_packet(&mut self) -> Result<Option<ControlPacket>> {
        let mut first_byte = [0u8; 1];
        if self.read_stream.read(&mut first_byte).await? == 0 {
            debug!(offset = self.position, "stream ended");
            return Ok(None);
        }
        self.decode_from(first_byte[0]).await.map(Some)
    }

    /// Decodes the next packet. End of stream is an error even between packets.
    pub async fn read_packet(&mut self) -> Result<ControlPacket> {
        let first_byte = self.read_stream.read_u8().await?;
        self.decode_from(first_byte).await
    }

    async fn decode_from(&mut self, first_byte: u8) -> Result<ControlPacket> {
        match self.dispatch(first_byte).await {
            Ok((packet, len)) => {
                debug!(packet_type = ?packet.packet_type(), offset = self.position, len, "decoded packet");
                self.position += len as u64;
                Ok(packet)
            }
            Err(e) => {
                warn!(offset = self.position, "rejected packet: {}", e);
                Err(e)
            }
        }
    }

    async fn dispatch(&mut self, first_byte: u8) -> Result<(ControlPacket, usize)> {
        let fixed_header = fixed_header_from_first_byte(first_byte, &mut self.read_stream).await?;
        let packet_type = fixed_header.packet_type;

        if fixed_header.remaining_length > self.config.max_packet_size {
            return Err(MqttError::PacketTooLarge {
                packet_type,
                remaining_length: fixed_header.remaining_length,
                max: self.config.max_packet_size,
            });
        }

        let decoder = self
            .decoders
            .get(&packet_type)
            .cloned()
            .ok_or(MqttError::NotImplemented(packet_type))?;

        let mut body = PacketBody::new(&mut self.read_stream, packet_type, fixed_header.remaining_length);
        let packet = decoder.decode(fixed_header, &mut body).await?;
        body.finish()?;

        Ok((packet, fixed_header.encoded_len + fixed_header.remaining_length))
    }
}

/// Decodes a single packet from `read_stream` with the default configuration.
pub async fn read_packet<R: AsyncRead + Unpin + Send>(read_stream: &mut R) -> Result<ControlPacket> {
    Decoder::new(read_stream).read_packet().await
}
