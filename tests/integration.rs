use bytes::{Bytes, BytesMut};
use rustie_mqtt_decoder::{
    read_packet, ControlPacket, ControlPacketType, Decoder, DecoderConfig, MqttError, QoS, SubscribeFilter, Will,
};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};
use tokio_test::io::Builder;

// CONNECT, level 4, clean session, keep-alive 10, empty client id.
const CONNECT: [u8; 14] = [
    0x10, 0x0C, 0x00, 0x04, 0x4D, 0x51, 0x54, 0x54, 0x04, 0x02, 0x00, 0x0A, 0x00, 0x00,
];

fn session_bytes() -> Vec<u8> {
    let mut bytes = CONNECT.to_vec();
    bytes.extend_from_slice(&[0x82, 0x06, 0x00, 0x01, 0x00, 0x01, b'#', 0x01]); // SUBSCRIBE
    bytes.extend_from_slice(&[0x32, 0x08, 0x00, 0x03, b'a', b'/', b'b', 0x00, 0x02, b'x']); // PUBLISH QoS 1
    bytes.extend_from_slice(&[0xC0, 0x00]); // PINGREQ
    bytes.extend_from_slice(&[0xE0, 0x00]); // DISCONNECT
    bytes
}

async fn decode_all<R: tokio::io::AsyncRead + Unpin + Send>(read_stream: R) -> Result<Vec<ControlPacket>, MqttError> {
    let mut decoder = Decoder::new(read_stream);
    let mut packets = Vec::new();
    while let Some(packet) = decoder.next_packet().await? {
        packets.push(packet);
    }
    Ok(packets)
}

#[tokio::test]
async fn test_decode_minimal_connect() {
    let mut source = &CONNECT[..];
    let packet = read_packet(&mut source).await.unwrap();

    let ControlPacket::Connect(connect) = packet else {
        panic!("expected CONNECT, got {:?}", packet);
    };
    assert_eq!(connect.fixed_header.packet_type, ControlPacketType::Connect);
    assert_eq!(connect.fixed_header.remaining_length, 12);
    assert_eq!(connect.variable_header.protocol_level, 4);
    assert!(connect.variable_header.connect_flags.clean_session);
    assert_eq!(connect.variable_header.keep_alive, 10);
    assert_eq!(connect.payload.client_identifier, "");
    assert!(source.is_empty());
}

#[tokio::test]
async fn test_session_decodes_in_order() {
    let bytes = session_bytes();
    let packets = decode_all(&bytes[..]).await.unwrap();

    let types: Vec<_> = packets.iter().map(ControlPacket::packet_type).collect();
    assert_eq!(
        types,
        vec![
            ControlPacketType::Connect,
            ControlPacketType::Subscribe,
            ControlPacketType::Publish,
            ControlPacketType::Pingreq,
            ControlPacketType::Disconnect,
        ]
    );
    assert_eq!(packets[1].packet_id(), Some(1));
    assert_eq!(packets[2].packet_id(), Some(2));
}

#[tokio::test]
async fn test_one_byte_per_read_matches_single_read() {
    let bytes = session_bytes();
    let mut builder = Builder::new();
    for byte in &bytes {
        builder.read(std::slice::from_ref(byte));
    }

    let trickled = decode_all(builder.build()).await.unwrap();
    let whole = decode_all(&bytes[..]).await.unwrap();
    assert_eq!(trickled, whole);
}

#[tokio::test]
async fn test_chunked_transport() {
    let bytes = session_bytes();
    let (mut client, server) = tokio::io::duplex(4);

    let writer = tokio::spawn(async move {
        for chunk in bytes.chunks(3) {
            client.write_all(chunk).await.unwrap();
            tokio::task::yield_now().await;
        }
    });

    let packets = timeout(Duration::from_secs(5), decode_all(server))
        .await
        .expect("decoder stalled")
        .unwrap();
    writer.await.unwrap();
    assert_eq!(packets.len(), 5);
    assert_eq!(packets[4], ControlPacket::Disconnect);
}

#[tokio::test]
async fn test_stream_cut_mid_packet() {
    let bytes = session_bytes();
    let cut = CONNECT.len() + 4;
    let mut decoder = Decoder::new(&bytes[..cut]);

    assert!(matches!(decoder.next_packet().await, Ok(Some(ControlPacket::Connect(_)))));
    assert!(matches!(
        decoder.next_packet().await,
        Err(MqttError::UnexpectedEndOfStream {
            packet_type: Some(ControlPacketType::Subscribe)
        })
    ));
    assert_eq!(decoder.position(), CONNECT.len() as u64);
}

#[tokio::test]
async fn test_tcp_unsupported_protocol() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let client = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut bytes = CONNECT;
        bytes[6] = b'X';
        bytes[7] = b'X';
        stream.write_all(&bytes).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    let (stream, _) = listener.accept().await.unwrap();
    let mut decoder = Decoder::new(stream);
    let err = decoder.read_packet().await.unwrap_err();

    assert!(matches!(&err, MqttError::UnsupportedProtocol(name) if name == "MQXX"));
    assert_eq!(err.connack_return_code(), Some(0x01));
    client.await.unwrap();
}

#[tokio::test]
async fn test_max_packet_size() {
    let bytes = session_bytes();
    let config = DecoderConfig::new().with_max_packet_size(8);
    let mut decoder = Decoder::with_config(&bytes[..], config);

    assert!(matches!(
        decoder.next_packet().await,
        Err(MqttError::PacketTooLarge {
            packet_type: ControlPacketType::Connect,
            remaining_length: 12,
            max: 8,
        })
    ));
}

#[tokio::test]
async fn test_rumqttc_connect_with_will_and_login() {
    let mut connect = rumqttc::Connect::new("sensor-7");
    connect.keep_alive = 30;
    connect.clean_session = false;
    connect.last_will = Some(rumqttc::LastWill::new(
        "status/sensor-7",
        b"offline".to_vec(),
        rumqttc::QoS::AtLeastOnce,
        true,
    ));
    connect.set_login("admin", "password");

    let mut buf = BytesMut::new();
    connect.write(&mut buf).unwrap();

    let ControlPacket::Connect(decoded) = read_packet(&mut &buf[..]).await.unwrap() else {
        panic!("expected CONNECT");
    };
    let flags = decoded.variable_header.connect_flags;
    assert_eq!(decoded.variable_header.protocol_name, "MQTT");
    assert_eq!(decoded.variable_header.protocol_level, 4);
    assert_eq!(decoded.variable_header.keep_alive, 30);
    assert!(!flags.clean_session);
    assert!(flags.will_flag && flags.will_retain);
    assert_eq!(flags.will_qos, QoS::AtLeastOnce);
    assert_eq!(decoded.payload.client_identifier, "sensor-7");
    assert_eq!(
        decoded.payload.will,
        Some(Will {
            topic: "status/sensor-7".to_string(),
            message: Bytes::from_static(b"offline"),
        })
    );
    assert_eq!(decoded.payload.user_name.as_deref(), Some("admin"));
    assert_eq!(decoded.payload.password, Some(Bytes::from_static(b"password")));
}

#[tokio::test]
async fn test_rumqttc_publish_subscribe_puback() {
    let mut buf = BytesMut::new();

    let mut publish = rumqttc::Publish::new("a/b", rumqttc::QoS::ExactlyOnce, b"payload".to_vec());
    publish.pkid = 11;
    publish.retain = true;
    publish.write(&mut buf).unwrap();

    let mut subscribe = rumqttc::Subscribe::new("sensors/+/temp", rumqttc::QoS::AtLeastOnce);
    subscribe.pkid = 12;
    subscribe.write(&mut buf).unwrap();

    rumqttc::PubAck::new(13).write(&mut buf).unwrap();

    let packets = decode_all(&buf[..]).await.unwrap();
    assert_eq!(packets.len(), 3);

    let ControlPacket::Publish(publish) = &packets[0] else {
        panic!("expected PUBLISH");
    };
    assert_eq!(publish.topic, "a/b");
    assert_eq!(publish.qos, QoS::ExactlyOnce);
    assert!(publish.retain);
    assert!(!publish.dup);
    assert_eq!(publish.packet_id, Some(11));
    assert_eq!(publish.payload, Bytes::from_static(b"payload"));

    let ControlPacket::Subscribe(subscribe) = &packets[1] else {
        panic!("expected SUBSCRIBE");
    };
    assert_eq!(subscribe.packet_id, 12);
    assert_eq!(
        subscribe.filters,
        vec![SubscribeFilter {
            topic_filter: "sensors/+/temp".to_string(),
            requested_qos: QoS::AtLeastOnce,
        }]
    );

    assert_eq!(packets[2], ControlPacket::Puback { packet_id: 13 });
}
