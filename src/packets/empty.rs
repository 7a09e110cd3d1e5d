use crate::decoder::PacketDecoder;
use crate::error::{MqttError, Result};
use crate::packet::FixedHeader;
use crate::packets::{check_flags, ControlPacket};
use crate::protocol::ControlPacketType;
use crate::reader::PacketBody;
use async_trait::async_trait;

/// Decodes PINGREQ, PINGRESP and DISCONNECT, which carry no body at all.
pub struct EmptyBodyDecoder;

#[async_trait]
impl PacketDecoder for EmptyBodyDecoder {
    async fn decode(&self, fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<ControlPacket> {
        check_flags(&fixed_header)?;
        body.finish()?;

        match fixed_header.packet_type {
            ControlPacketType::Pingreq => Ok(ControlPacket::Pingreq),
            ControlPacketType::Pingresp => Ok(ControlPacket::Pingresp),
            ControlPacketType::Disconnect => Ok(ControlPacket::Disconnect),
            other => Err(MqttError::NotImplemented(other)),
        }
    }
}
