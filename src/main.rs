use rustie_mqtt_decoder::{Decoder, DecoderConfig, MqttError};
use tokio::io::{AsyncRead, BufReader};
use tracing::{error, info};

/// Decodes a captured MQTT byte stream (file argument or stdin) and logs each packet.
#[tokio::main]
async fn main() -> Result<(), MqttError> {
    tracing_subscriber::fmt().init();

    let mut args = std::env::args().skip(1);
    let path = args.next();
    let config = match args.next() {
        Some(max) => {
            let max = max
                .parse()
                .map_err(|e| MqttError::Protocol(format!("Invalid max packet size '{}': {}", max, e)))?;
            DecoderConfig::new().with_max_packet_size(max)
        }
        None => DecoderConfig::new(),
    };

    match path.as_deref() {
        Some("-") | None => dump(BufReader::new(tokio::io::stdin()), config).await,
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            info!("Decoding {}", path);
            dump(BufReader::new(file), config).await
        }
    }
}

async fn dump<R: AsyncRead + Unpin + Send>(read_stream: R, config: DecoderConfig) -> Result<(), MqttError> {
    let mut decoder = Decoder::with_config(read_stream, config);
    let mut count = 0usize;

    loop {
        match decoder.next_packet().await {
            Ok(Some(packet)) => {
                count += 1;
                info!("{:?}", packet);
            }
            Ok(None) => {
                info!("Decoded {} packets ({} bytes)", count, decoder.position());
                return Ok(());
            }
            Err(e) => {
                match e.packet_type() {
                    Some(packet_type) => error!(
                        "Error decoding {:?} packet at offset {}: {}",
                        packet_type,
                        decoder.position(),
                        e
                    ),
                    None => error!("Error decoding packet at offset {}: {}", decoder.position(), e),
                }
                if let Some(code) = e.connack_return_code() {
                    error!("A server would answer with CONNACK return code {:#04x}", code);
                }
                return Err(e);
            }
        }
    }
}
