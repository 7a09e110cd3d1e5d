use crate::decoder::PacketDecoder;
use crate::error::{MqttError, Result};
use crate::packet::FixedHeader;
use crate::packets::{check_flags, read_packet_id, ControlPacket};
use crate::reader::PacketBody;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsubscribe {
    pub packet_id: u16,
    pub topic_filters: Vec<String>,
}

impl Unsubscribe {
    pub async fn decode(fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<Unsubscribe> {
        check_flags(&fixed_header)?;
        let packet_id = read_packet_id(body).await?;

        let mut topic_filters = Vec::new();
        while body.remaining() > 0 {
            topic_filters.push(body.read_string().await?);
        }
        if topic_filters.is_empty() {
            return Err(MqttError::Protocol("UNSUBSCRIBE without topic filters".to_string()));
        }
        body.finish()?;

        Ok(Unsubscribe {
            packet_id,
            topic_filters,
        })
    }
}

pub struct UnsubscribeDecoder;

#[async_trait]
impl PacketDecoder for UnsubscribeDecoder {
    async fn decode(&self, fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<ControlPacket> {
        Ok(ControlPacket::Unsubscribe(Unsubscribe::decode(fixed_header, body).await?))
    }
}
