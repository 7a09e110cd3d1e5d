use crate::error::MqttError;

/// Protocol name carried by every MQTT 3.1.1 CONNECT packet.
pub const PROTOCOL_NAME: &str = "MQTT";

/// Largest value the 4-byte Remaining Length encoding can carry.
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// Remaining Length never spans more than four bytes.
pub const MAX_REMAINING_LENGTH_BYTES: usize = 4;

// Connect flags byte.
pub const CONNECT_FLAG_USER_NAME: u8 = 0x80;
pub const CONNECT_FLAG_PASSWORD: u8 = 0x40;
pub const CONNECT_FLAG_WILL_RETAIN: u8 = 0x20;
pub const CONNECT_FLAG_WILL_QOS: u8 = 0x18;
pub const CONNECT_FLAG_WILL_QOS_SHIFT: u8 = 3;
pub const CONNECT_FLAG_WILL: u8 = 0x04;
pub const CONNECT_FLAG_CLEAN_SESSION: u8 = 0x02;
pub const CONNECT_FLAG_RESERVED: u8 = 0x01;

// PUBLISH fixed header flags.
pub const PUBLISH_FLAG_DUP: u8 = 0x08;
pub const PUBLISH_FLAG_QOS: u8 = 0x06;
pub const PUBLISH_FLAG_QOS_SHIFT: u8 = 1;
pub const PUBLISH_FLAG_RETAIN: u8 = 0x01;

/// Fixed header flags required on PUBREL, SUBSCRIBE and UNSUBSCRIBE.
pub const FLAGS_RESERVED_0010: u8 = 0b0010;

pub const CONNACK_FLAG_SESSION_PRESENT: u8 = 0x01;
pub const SUBACK_FAILURE: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlPacketType {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
}

impl ControlPacketType {
    pub const ALL: [ControlPacketType; 14] = [
        ControlPacketType::Connect,
        ControlPacketType::Connack,
        ControlPacketType::Publish,
        ControlPacketType::Puback,
        ControlPacketType::Pubrec,
        ControlPacketType::Pubrel,
        ControlPacketType::Pubcomp,
        ControlPacketType::Subscribe,
        ControlPacketType::Suback,
        ControlPacketType::Unsubscribe,
        ControlPacketType::Unsuback,
        ControlPacketType::Pingreq,
        ControlPacketType::Pingresp,
        ControlPacketType::Disconnect,
    ];

    /// Flags nibble the fixed header must carry for this packet type.
    /// PUBLISH returns `None` because its flags are DUP/QoS/RETAIN.
    pub fn required_flags(self) -> Option<u8> {
        match self {
            ControlPacketType::Publish => None,
            ControlPacketType::Pubrel
            | ControlPacketType::Subscribe
            | ControlPacketType::Unsubscribe => Some(FLAGS_RESERVED_0010),
            _ => Some(0),
        }
    }
}

impl TryFrom<u8> for ControlPacketType {
    type Error = MqttError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let packet_type = match code {
            1 => ControlPacketType::Connect,
            2 => ControlPacketType::Connack,
            3 => ControlPacketType::Publish,
            4 => ControlPacketType::Puback,
            5 => ControlPacketType::Pubrec,
            6 => ControlPacketType::Pubrel,
            7 => ControlPacketType::Pubcomp,
            8 => ControlPacketType::Subscribe,
            9 => ControlPacketType::Suback,
            10 => ControlPacketType::Unsubscribe,
            11 => ControlPacketType::Unsuback,
            12 => ControlPacketType::Pingreq,
            13 => ControlPacketType::Pingresp,
            14 => ControlPacketType::Disconnect,
            other => return Err(MqttError::UnknownPacketType(other)),
        };
        Ok(packet_type)
    }
}

/// MQTT Quality of Service level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl QoS {
    /// Decodes a 2-bit QoS value. 3 is reserved and yields `None`.
    pub fn from_bits(bits: u8) -> Option<QoS> {
        match bits {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            2 => Some(QoS::ExactlyOnce),
            _ => None,
        }
    }
}
