use crate::decoder::PacketDecoder;
use crate::error::{MqttError, Result};
use crate::packet::FixedHeader;
use crate::packets::{check_flags, ControlPacket};
use crate::protocol::*;
use crate::reader::PacketBody;
use async_trait::async_trait;
use bytes::Bytes;

/// Flags carried in the CONNECT variable header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectFlags {
    pub user_name: bool,
    pub password: bool,
    pub will_retain: bool,
    pub will_qos: QoS,
    pub will_flag: bool,
    pub clean_session: bool,
}

impl ConnectFlags {
    /// Decodes the connect flags byte.
    ///
    /// Fails with `MalformedFlags` when the reserved bit is set, the will QoS is 3,
    /// will QoS or will retain are set without the will flag, or a password is
    /// announced without a user name.
    pub fn from_byte(byte: u8) -> Result<ConnectFlags> {
        let flags = ConnectFlags::from_byte_lenient(byte)?;

        let malformed = || MqttError::MalformedFlags {
            packet_type: ControlPacketType::Connect,
            flags: byte,
        };
        if !flags.will_flag && (flags.will_retain || flags.will_qos != QoS::AtMostOnce) {
            return Err(malformed());
        }
        if flags.password && !flags.user_name {
            return Err(malformed());
        }

        Ok(flags)
    }

    /// Decodes the connect flags byte, rejecting only the reserved bit and will QoS 3.
    pub fn from_byte_lenient(byte: u8) -> Result<ConnectFlags> {
        let malformed = || MqttError::MalformedFlags {
            packet_type: ControlPacketType::Connect,
            flags: byte,
        };

        if byte & CONNECT_FLAG_RESERVED != 0 {
            return Err(malformed());
        }

        let will_qos = QoS::from_bits((byte & CONNECT_FLAG_WILL_QOS) >> CONNECT_FLAG_WILL_QOS_SHIFT)
            .ok_or_else(malformed)?;

        Ok(ConnectFlags {
            user_name: byte & CONNECT_FLAG_USER_NAME != 0,
            password: byte & CONNECT_FLAG_PASSWORD != 0,
            will_retain: byte & CONNECT_FLAG_WILL_RETAIN != 0,
            will_qos,
            will_flag: byte & CONNECT_FLAG_WILL != 0,
            clean_session: byte & CONNECT_FLAG_CLEAN_SESSION != 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectVariableHeader {
    pub protocol_name: String,
    pub protocol_level: u8,
    pub connect_flags: ConnectFlags,
    pub keep_alive: u16,
}

/// Last will published on the client's behalf after an unexpected disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Will {
    pub topic: String,
    pub message: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPayload {
    /// May be empty; whether to assign one is up to the session layer.
    pub client_identifier: String,
    pub will: Option<Will>,
    pub user_name: Option<String>,
    pub password: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect {
    pub fixed_header: FixedHeader,
    pub variable_header: ConnectVariableHeader,
    pub payload: ConnectPayload,
}

impl Connect {
    /// Decodes the CONNECT variable header and payload.
    ///
    /// # Arguments
    /// * `fixed_header` - The already decoded fixed header.
    /// * `body` - The packet body, bounded to the Remaining Length.
    ///
    /// # Returns
    /// The CONNECT packet, or an error if any field is malformed or the fields do not
    /// add up to exactly the Remaining Length.
    pub async fn decode(fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<Connect> {
        decode_connect(fixed_header, body, true).await
    }
}

async fn decode_connect(fixed_header: FixedHeader, body: &mut PacketBody<'_>, strict_flags: bool) -> Result<Connect> {
    check_flags(&fixed_header)?;

    let variable_header = decode_variable_header(body, strict_flags).await?;
    let payload = decode_payload(&variable_header.connect_flags, body).await?;
    body.finish()?;

    Ok(Connect {
        fixed_header,
        variable_header,
        payload,
    })
}

async fn decode_variable_header(body: &mut PacketBody<'_>, strict_flags: bool) -> Result<ConnectVariableHeader> {
    let protocol_name = body.read_string().await?;
    if protocol_name != PROTOCOL_NAME {
        return Err(MqttError::UnsupportedProtocol(protocol_name));
    }

    let protocol_level = body.read_u8().await?;
    let flags_byte = body.read_u8().await?;
    let connect_flags = if strict_flags {
        ConnectFlags::from_byte(flags_byte)?
    } else {
        ConnectFlags::from_byte_lenient(flags_byte)?
    };
    let keep_alive = body.read_u16().await?;

    Ok(ConnectVariableHeader {
        protocol_name,
        protocol_level,
        connect_flags,
        keep_alive,
    })
}

// Fields MUST appear in the order client id, will topic, will message, user name, password.
async fn decode_payload(flags: &ConnectFlags, body: &mut PacketBody<'_>) -> Result<ConnectPayload> {
    let client_identifier = body.read_string().await?;

    let will = if flags.will_flag {
        let topic = body.read_string().await?;
        let message = body.read_binary().await?;
        Some(Will { topic, message })
    } else {
        None
    };

    let user_name = if flags.user_name {
        Some(body.read_string().await?)
    } else {
        None
    };

    let password = if flags.password {
        Some(body.read_binary().await?)
    } else {
        None
    };

    Ok(ConnectPayload {
        client_identifier,
        will,
        user_name,
        password,
    })
}

/// Decodes CONNECT packets. The default rejects every connect flag combination
/// MQTT 3.1.1 forbids; [`ConnectDecoder::lenient`] only rejects the reserved bit
/// and will QoS 3.
#[derive(Debug, Clone, Copy)]
pub struct ConnectDecoder {
    strict_flags: bool,
}

impl Default for ConnectDecoder {
    fn default() -> Self {
        ConnectDecoder::new()
    }
}

impl ConnectDecoder {
    pub fn new() -> Self {
        ConnectDecoder { strict_flags: true }
    }

    pub fn lenient() -> Self {
        ConnectDecoder { strict_flags: false }
    }
}

#[async_trait]
impl PacketDecoder for ConnectDecoder {
    async fn decode(&self, fixed_header: FixedHeader, body: &mut PacketBody<'_>) -> Result<ControlPacket> {
        let connect = decode_connect(fixed_header, body, self.strict_flags).await?;
        Ok(ControlPacket::Connect(connect))
    }
}
