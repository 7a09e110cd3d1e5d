use crate::error::{MqttError, Result};
use crate::protocol::{ControlPacketType, MAX_REMAINING_LENGTH_BYTES};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

/// The fixed header present on every MQTT packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    pub packet_type: ControlPacketType,
    /// Low nibble of the first byte, left for the per-type decoder to interpret.
    pub flags: u8,
    /// Exact byte count of the variable header plus payload.
    pub remaining_length: usize,
    /// Bytes the fixed header itself occupied on the wire.
    pub encoded_len: usize,
}

/// Decodes the variable-length Remaining Length field.
///
/// Returns the decoded value and the number of bytes it was encoded in.
pub async fn read_remaining_length<R: AsyncRead + Unpin>(read_stream: &mut R) -> Result<(usize, usize)> {
    let mut remaining_length = 0usize;
    let mut multiplier = 1usize;

    for i in 0..MAX_REMAINING_LENGTH_BYTES {
        let byte = read_stream.read_u8().await?;
        remaining_length += ((byte & 0x7F) as usize) * multiplier;
        if byte & 0x80 == 0 {
            return Ok((remaining_length, i + 1));
        }
        multiplier *= 128;
    }

    Err(MqttError::MalformedVarInt)
}

/// Reads one fixed header: control byte, then Remaining Length.
pub async fn read_fixed_header<R: AsyncRead + Unpin>(read_stream: &mut R) -> Result<FixedHeader> {
    let first_byte = read_stream.read_u8().await?;
    fixed_header_from_first_byte(first_byte, read_stream).await
}

pub(crate) async fn fixed_header_from_first_byte<R: AsyncRead + Unpin>(
    first_byte: u8,
    read_stream: &mut R,
) -> Result<FixedHeader> {
    let packet_type = ControlPacketType::try_from(first_byte >> 4)?;
    let flags = first_byte & 0x0F;
    let (remaining_length, length_bytes) = read_remaining_length(read_stream)
        .await
        .map_err(|e| e.in_packet(packet_type))?;

    trace!(?packet_type, flags, remaining_length, "read fixed header");

    Ok(FixedHeader {
        packet_type,
        flags,
        remaining_length,
        encoded_len: 1 + length_bytes,
    })
}
