use crate::decoder::PacketDecoder;
use crate::error::{MqttError, Result};
use crate::packet::FixedHeader;
use crate::packets::{check_flags, read_packet_id, ControlPacket};
use crate::protocol::ControlPacketType;
use crate::reader::PacketBody;
use async_trait::async_trait;

/// Decodes the packets whose whole body is a packet identifier:
/// PUBACK, PUBREC, PUBREL, PUBCOMP and UNSUBACK.
pub struct PacketIdDecoder;

#[async_trait]
impl PacketDecoder for PacketIdDecoder {
    async fn decode(&self, fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<ControlPacket> {
        check_flags(&fixed_header)?;
        let packet_id = read_packet_id(body).await?;
        body.finish()?;

        let packet = match fixed_header.packet_type {
            ControlPacketType::Puback => ControlPacket::Puback { packet_id },
            ControlPacketType::Pubrec => ControlPacket::Pubrec { packet_id },
            ControlPacketType::Pubrel => ControlPacket::Pubrel { packet_id },
            ControlPacketType::Pubcomp => ControlPacket::Pubcomp { packet_id },
            ControlPacketType::Unsuback => ControlPacket::Unsuback { packet_id },
            other => return Err(MqttError::NotImplemented(other)),
        };
        Ok(packet)
    }
}
