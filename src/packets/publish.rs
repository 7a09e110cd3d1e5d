use crate::decoder::PacketDecoder;
use crate::error::{MqttError, Result};
use crate::packet::FixedHeader;
use crate::packets::{read_packet_id, ControlPacket};
use crate::protocol::*;
use crate::reader::PacketBody;
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publish {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    pub topic: String,
    /// Present only for QoS 1 and 2.
    pub packet_id: Option<u16>,
    pub payload: Bytes,
}

impl Publish {
    pub async fn decode(fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<Publish> {
        let flags = fixed_header.flags;
        let malformed = || MqttError::MalformedFlags {
            packet_type: ControlPacketType::Publish,
            flags,
        };

        let qos = QoS::from_bits((flags & PUBLISH_FLAG_QOS) >> PUBLISH_FLAG_QOS_SHIFT).ok_or_else(malformed)?;
        let dup = flags & PUBLISH_FLAG_DUP != 0;
        if dup && qos == QoS::AtMostOnce {
            return Err(malformed());
        }

        let topic = body.read_string().await?;
        let packet_id = match qos {
            QoS::AtMostOnce => None,
            QoS::AtLeastOnce | QoS::ExactlyOnce => Some(read_packet_id(body).await?),
        };
        let payload = body.read_to_end().await?;
        body.finish()?;

        Ok(Publish {
            dup,
            qos,
            retain: flags & PUBLISH_FLAG_RETAIN != 0,
            topic,
            packet_id,
            payload,
        })
    }
}

pub struct PublishDecoder;

#[async_trait]
impl PacketDecoder for PublishDecoder {
    async fn decode(&self, fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<ControlPacket> {
        Ok(ControlPacket::Publish(Publish::decode(fixed_header, body).await?))
    }
}
