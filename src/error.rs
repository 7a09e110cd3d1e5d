use crate::protocol::ControlPacketType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MqttError {
    #[error("Unexpected end of stream{}", packet_suffix(.packet_type))]
    UnexpectedEndOfStream { packet_type: Option<ControlPacketType> },
    #[error("Malformed remaining length: encoding exceeds 4 bytes")]
    MalformedVarInt,
    #[error("Unknown packet type: {0}")]
    UnknownPacketType(u8),
    #[error("Unsupported protocol '{0}'")]
    UnsupportedProtocol(String),
    #[error("Malformed flags {flags:#06b} in {packet_type:?} packet")]
    MalformedFlags {
        packet_type: ControlPacketType,
        flags: u8,
    },
    #[error("Payload length mismatch in {packet_type:?} packet: declared {declared} bytes, fields need {actual}")]
    PayloadLengthMismatch {
        packet_type: ControlPacketType,
        declared: usize,
        actual: usize,
    },
    #[error("Invalid UTF-8 string{}: {source}", packet_suffix(.packet_type))]
    InvalidEncoding {
        packet_type: Option<ControlPacketType>,
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("No decoder registered for {0:?}")]
    NotImplemented(ControlPacketType),
    #[error("Packet too large: {packet_type:?} declares {remaining_length} bytes, limit is {max}")]
    PacketTooLarge {
        packet_type: ControlPacketType,
        remaining_length: usize,
        max: usize,
    },
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
}

impl From<std::io::Error> for MqttError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            MqttError::UnexpectedEndOfStream { packet_type: None }
        } else {
            MqttError::Io(e)
        }
    }
}

fn packet_suffix(packet_type: &Option<ControlPacketType>) -> String {
    packet_type
        .map(|packet_type| format!(" in {:?} packet", packet_type))
        .unwrap_or_default()
}

impl MqttError {
    /// The packet type being decoded when the error was raised, if known.
    pub fn packet_type(&self) -> Option<ControlPacketType> {
        match self {
            MqttError::UnexpectedEndOfStream { packet_type } | MqttError::InvalidEncoding { packet_type, .. } => {
                *packet_type
            }
            MqttError::MalformedFlags { packet_type, .. }
            | MqttError::PayloadLengthMismatch { packet_type, .. }
            | MqttError::PacketTooLarge { packet_type, .. } => Some(*packet_type),
            MqttError::NotImplemented(packet_type) => Some(*packet_type),
            MqttError::UnsupportedProtocol(_) => Some(ControlPacketType::Connect),
            _ => None,
        }
    }

    /// Fills in the packet type on errors raised below the packet layer.
    pub(crate) fn in_packet(self, packet_type: ControlPacketType) -> Self {
        match self {
            MqttError::UnexpectedEndOfStream { packet_type: None } => MqttError::UnexpectedEndOfStream {
                packet_type: Some(packet_type),
            },
            MqttError::InvalidEncoding {
                packet_type: None,
                source,
            } => MqttError::InvalidEncoding {
                packet_type: Some(packet_type),
                source,
            },
            other => other,
        }
    }

    /// Returns the CONNACK return code a server should answer with when this
    /// error was raised while decoding a CONNECT packet, if one applies.
    pub fn connack_return_code(&self) -> Option<u8> {
        match self {
            MqttError::UnsupportedProtocol(_) => Some(0x01),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MqttError>;
