//! Streaming decoder for MQTT 3.1.1 control packets.
//!
//! Packets are read one at a time from any tokio [`AsyncRead`](tokio::io::AsyncRead):
//! the fixed header first, then a per-type decoder bounded to the Remaining Length.
//!
//! ```no_run
//! use rustie_mqtt_decoder::{ControlPacket, Decoder};
//! use tokio::net::TcpStream;
//!
//! # async fn run(stream: TcpStream) -> Result<(), rustie_mqtt_decoder::MqttError> {
//! let mut decoder = Decoder::new(stream);
//! while let Some(packet) = decoder.next_packet().await? {
//!     if let ControlPacket::Connect(connect) = packet {
//!         println!("client {} connected", connect.payload.client_identifier);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod decoder;
mod error;
mod packet;
mod packets;
mod protocol;
mod reader;

pub use decoder::{default_decoder, read_packet, Decoder, DecoderConfig, PacketDecoder};
pub use error::{MqttError, Result};
pub use packet::{read_fixed_header, read_remaining_length, FixedHeader};
pub use packets::*;
pub use protocol::{ControlPacketType, QoS, MAX_REMAINING_LENGTH, PROTOCOL_NAME};
pub use reader::PacketBody;
