use crate::decoder::PacketDecoder;
use crate::error::{MqttError, Result};
use crate::packet::FixedHeader;
use crate::packets::{check_flags, ControlPacket};
use crate::protocol::{ControlPacketType, CONNACK_FLAG_SESSION_PRESENT};
use crate::reader::PacketBody;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectReturnCode {
    Accepted = 0x00,
    UnacceptableProtocolVersion = 0x01,
    IdentifierRejected = 0x02,
    ServerUnavailable = 0x03,
    BadUserNameOrPassword = 0x04,
    NotAuthorized = 0x05,
}

impl TryFrom<u8> for ConnectReturnCode {
    type Error = MqttError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0x00 => Ok(ConnectReturnCode::Accepted),
            0x01 => Ok(ConnectReturnCode::UnacceptableProtocolVersion),
            0x02 => Ok(ConnectReturnCode::IdentifierRejected),
            0x03 => Ok(ConnectReturnCode::ServerUnavailable),
            0x04 => Ok(ConnectReturnCode::BadUserNameOrPassword),
            0x05 => Ok(ConnectReturnCode::NotAuthorized),
            other => Err(MqttError::Protocol(format!("Unknown CONNACK return code {other:#04x}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connack {
    pub session_present: bool,
    pub return_code: ConnectReturnCode,
}

impl Connack {
    pub async fn decode(fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<Connack> {
        check_flags(&fixed_header)?;

        let ack_flags = body.read_u8().await?;
        if ack_flags & !CONNACK_FLAG_SESSION_PRESENT != 0 {
            return Err(MqttError::MalformedFlags {
                packet_type: ControlPacketType::Connack,
                flags: ack_flags,
            });
        }
        let return_code = ConnectReturnCode::try_from(body.read_u8().await?)?;
        body.finish()?;

        Ok(Connack {
            session_present: ack_flags & CONNACK_FLAG_SESSION_PRESENT != 0,
            return_code,
        })
    }
}

pub struct ConnackDecoder;

#[async_trait]
impl PacketDecoder for ConnackDecoder {
    async fn decode(&self, fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<ControlPacket> {
        Ok(ControlPacket::Connack(Connack::decode(fixed_header, body).await?))
    }
}
