//! One decoder per control packet type. Each consumes exactly the Remaining
//! Length announced by the fixed header.

mod ack;
mod connack;
mod connect;
mod empty;
mod publish;
mod suback;
mod subscribe;
mod unsubscribe;

pub use ack::PacketIdDecoder;
pub use connack::{Connack, ConnackDecoder, ConnectReturnCode};
pub use connect::{Connect, ConnectDecoder, ConnectFlags, ConnectPayload, ConnectVariableHeader, Will};
pub use empty::EmptyBodyDecoder;
pub use publish::{Publish, PublishDecoder};
pub use suback::{Suback, SubackDecoder, SubscribeReturnCode};
pub use subscribe::{Subscribe, SubscribeDecoder, SubscribeFilter};
pub use unsubscribe::{Unsubscribe, UnsubscribeDecoder};

use crate::error::{MqttError, Result};
use crate::packet::FixedHeader;
use crate::protocol::ControlPacketType;
use crate::reader::PacketBody;

/// A fully decoded MQTT control packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPacket {
    Connect(Connect),
    Connack(Connack),
    Publish(Publish),
    Puback { packet_id: u16 },
    Pubrec { packet_id: u16 },
    Pubrel { packet_id: u16 },
    Pubcomp { packet_id: u16 },
    Subscribe(Subscribe),
    Suback(Suback),
    Unsubscribe(Unsubscribe),
    Unsuback { packet_id: u16 },
    Pingreq,
    Pingresp,
    Disconnect,
}

impl ControlPacket {
    pub fn packet_type(&self) -> ControlPacketType {
        match self {
            ControlPacket::Connect(_) => ControlPacketType::Connect,
            ControlPacket::Connack(_) => ControlPacketType::Connack,
            ControlPacket::Publish(_) => ControlPacketType::Publish,
            ControlPacket::Puback { .. } => ControlPacketType::Puback,
            ControlPacket::Pubrec { .. } => ControlPacketType::Pubrec,
            ControlPacket::Pubrel { .. } => ControlPacketType::Pubrel,
            ControlPacket::Pubcomp { .. } => ControlPacketType::Pubcomp,
            ControlPacket::Subscribe(_) => ControlPacketType::Subscribe,
            ControlPacket::Suback(_) => ControlPacketType::Suback,
            ControlPacket::Unsubscribe(_) => ControlPacketType::Unsubscribe,
            ControlPacket::Unsuback { .. } => ControlPacketType::Unsuback,
            ControlPacket::Pingreq => ControlPacketType::Pingreq,
            ControlPacket::Pingresp => ControlPacketType::Pingresp,
            ControlPacket::Disconnect => ControlPacketType::Disconnect,
        }
    }

    /// Packet identifier, for the packet types that carry one.
    pub fn packet_id(&self) -> Option<u16> {
        match self {
            ControlPacket::Publish(publish) => publish.packet_id,
            ControlPacket::Puback { packet_id }
            | ControlPacket::Pubrec { packet_id }
            | ControlPacket::Pubrel { packet_id }
            | ControlPacket::Pubcomp { packet_id }
            | ControlPacket::Unsuback { packet_id } => Some(*packet_id),
            ControlPacket::Subscribe(subscribe) => Some(subscribe.packet_id),
            ControlPacket::Suback(suback) => Some(suback.packet_id),
            ControlPacket::Unsubscribe(unsubscribe) => Some(unsubscribe.packet_id),
            _ => None,
        }
    }
}

/// Rejects a fixed header whose flags nibble differs from the one its type requires.
pub(crate) fn check_flags(fixed_header: &FixedHeader) -> Result<()> {
    match fixed_header.packet_type.required_flags() {
        Some(required) if required != fixed_header.flags => Err(MqttError::MalformedFlags {
            packet_type: fixed_header.packet_type,
            flags: fixed_header.flags,
        }),
        _ => Ok(()),
    }
}

/// Reads a packet identifier, which must be non-zero.
pub(crate) async fn read_packet_id(body: &mut PacketBody<'_>) -> Result<u16> {
    let packet_id = body.read_u16().await?;
    if packet_id == 0 {
        return Err(MqttError::Protocol(format!(
            "Packet identifier 0 in {:?} packet",
            body.packet_type()
        )));
    }
    Ok(packet_id)
}
