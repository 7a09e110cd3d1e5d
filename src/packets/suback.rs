use crate::decoder::PacketDecoder;
use crate::error::{MqttError, Result};
use crate::packet::FixedHeader;
use crate::packets::{check_flags, read_packet_id, ControlPacket};
use crate::protocol::{QoS, SUBACK_FAILURE};
use crate::reader::PacketBody;
use async_trait::async_trait;

/// Outcome of one subscription request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeReturnCode {
    Granted(QoS),
    Failure,
}

impl TryFrom<u8> for SubscribeReturnCode {
    type Error = MqttError;

    fn try_from(code: u8) -> Result<Self> {
        if code == SUBACK_FAILURE {
            return Ok(SubscribeReturnCode::Failure);
        }
        QoS::from_bits(code)
            .map(SubscribeReturnCode::Granted)
            .ok_or_else(|| MqttError::Protocol(format!("Unknown SUBACK return code {code:#04x}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suback {
    pub packet_id: u16,
    pub return_codes: Vec<SubscribeReturnCode>,
}

impl Suback {
    pub async fn decode(fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<Suback> {
        check_flags(&fixed_header)?;
        let packet_id = read_packet_id(body).await?;

        let mut return_codes = Vec::new();
        while body.remaining() > 0 {
            return_codes.push(SubscribeReturnCode::try_from(body.read_u8().await?)?);
        }
        if return_codes.is_empty() {
            return Err(MqttError::Protocol("SUBACK without return codes".to_string()));
        }
        body.finish()?;

        Ok(Suback {
            packet_id,
            return_codes,
        })
    }
}

pub struct SubackDecoder;

#[async_trait]
impl PacketDecoder for SubackDecoder {
    async fn decode(&self, fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<ControlPacket> {
        Ok(ControlPacket::Suback(Suback::decode(fixed_header, body).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::tests::decode_with;
    use crate::protocol::ControlPacketType;

    #[tokio::test]
    async fn decodes_return_codes() {
        let bytes = [0x90, 0x05, 0x00, 0x07, 0x00, 0x80, 0x02];
        assert_eq!(
            decode_with(SubackDecoder, &bytes).await.unwrap(),
            ControlPacket::Suback(Suback {
                packet_id: 7,
                return_codes: vec![
                    SubscribeReturnCode::Granted(QoS::AtMostOnce),
                    SubscribeReturnCode::Failure,
                    SubscribeReturnCode::Granted(QoS::ExactlyOnce),
                ],
            })
        );
    }

    #[tokio::test]
    async fn truncated_return_codes_are_end_of_stream() {
        let bytes = [0x90, 0x05, 0x00, 0x07, 0x00];
        assert!(matches!(
            decode_with(SubackDecoder, &bytes).await,
            Err(MqttError::UnexpectedEndOfStream {
                packet_type: Some(ControlPacketType::Suback)
            })
        ));
    }

    #[tokio::test]
    async fn unknown_return_code_is_rejected() {
        let bytes = [0x90, 0x03, 0x00, 0x07, 0x03];
        assert!(matches!(
            decode_with(SubackDecoder, &bytes).await,
            Err(MqttError::Protocol(_))
        ));
    }
}
