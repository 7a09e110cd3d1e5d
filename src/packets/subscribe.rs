use crate::decoder::PacketDecoder;
use crate::error::{MqttError, Result};
use crate::packet::FixedHeader;
use crate::packets::{check_flags, read_packet_id, ControlPacket};
use crate::protocol::{ControlPacketType, QoS};
use crate::reader::PacketBody;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeFilter {
    pub topic_filter: String,
    pub requested_qos: QoS,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscribe {
    pub packet_id: u16,
    pub filters: Vec<SubscribeFilter>,
}

impl Subscribe {
    pub async fn decode(fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<Subscribe> {
        check_flags(&fixed_header)?;
        let packet_id = read_packet_id(body).await?;

        let mut filters = Vec::new();
        while body.remaining() > 0 {
            let topic_filter = body.read_string().await?;
            let options = body.read_u8().await?;
            // Upper six bits are reserved.
            let requested_qos = QoS::from_bits(options).ok_or(MqttError::MalformedFlags {
                packet_type: ControlPacketType::Subscribe,
                flags: options,
            })?;
            filters.push(SubscribeFilter {
                topic_filter,
                requested_qos,
            });
        }

        if filters.is_empty() {
            return Err(MqttError::Protocol("SUBSCRIBE without topic filters".to_string()));
        }
        body.finish()?;

        Ok(Subscribe { packet_id, filters })
    }
}

pub struct SubscribeDecoder;

#[async_trait]
impl PacketDecoder for SubscribeDecoder {
    async fn decode(&self, fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<ControlPacket> {
        Ok(ControlPacket::Subscribe(Subscribe::decode(fixed_header, body).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::tests::decode_with;

    #[tokio::test]
    async fn decodes_multiple_filters() {
        let bytes = [
            0x82, 0x0F, 0x00, 0x0A, // packet id 10
            0x00, 0x03, b'a', b'/', b'#', 0x01, //
            0x00, 0x04, b'x', b'/', b'+', b'y', 0x02,
        ];

        let ControlPacket::Subscribe(subscribe) = decode_with(SubscribeDecoder, &bytes).await.unwrap() else {
            panic!("expected SUBSCRIBE");
        };
        assert_eq!(subscribe.packet_id, 10);
        assert_eq!(
            subscribe.filters,
            vec![
                SubscribeFilter {
                    topic_filter: "a/#".to_string(),
                    requested_qos: QoS::AtLeastOnce,
                },
                SubscribeFilter {
                    topic_filter: "x/+y".to_string(),
                    requested_qos: QoS::ExactlyOnce,
                },
            ]
        );
    }

    #[tokio::test]
    async fn requires_flags_0010() {
        let bytes = [0x80, 0x06, 0x00, 0x01, 0x00, 0x01, b'a', 0x00];
        assert!(matches!(
            decode_with(SubscribeDecoder, &bytes).await,
            Err(MqttError::MalformedFlags {
                packet_type: ControlPacketType::Subscribe,
                flags: 0,
            })
        ));
    }

    #[tokio::test]
    async fn reserved_option_bits_are_malformed() {
        let bytes = [0x82, 0x06, 0x00, 0x01, 0x00, 0x01, b'a', 0x04];
        assert!(matches!(
            decode_with(SubscribeDecoder, &bytes).await,
            Err(MqttError::MalformedFlags { flags: 0x04, .. })
        ));
    }

    #[tokio::test]
    async fn empty_filter_list_is_a_protocol_error() {
        assert!(matches!(
            decode_with(SubscribeDecoder, &[0x82, 0x02, 0x00, 0x01]).await,
            Err(MqttError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn missing_qos_byte_is_a_mismatch() {
        let bytes = [0x82, 0x05, 0x00, 0x01, 0x00, 0x01, b'a'];
        assert!(matches!(
            decode_with(SubscribeDecoder, &bytes).await,
            Err(MqttError::PayloadLengthMismatch {
                declared: 5,
                actual: 6,
                ..
            })
        ));
    }
}
