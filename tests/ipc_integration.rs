//! Integration tests for the localhost connection.
//!
//! A test listener plays the APL host: it accepts the companion's
//! connection, writes payload lines and reads back what the companion
//! sends.

use std::net::Ipv4Addr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::timeout;

use aplbridge::codec;
use aplbridge::ipc::{serve_echo, Connection};
use aplbridge::TypeTag;

/// Test timeout to prevent hanging tests.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn host_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("Failed to bind listener");
    let port = listener.local_addr().expect("No local address").port();
    (listener, port)
}

#[tokio::test]
async fn test_connect_falls_back_to_ipv4() {
    let (listener, port) = host_listener().await;

    let (conn, accepted) = tokio::join!(Connection::connect_localhost(port), listener.accept());
    let conn = conn.expect("Connect failed");
    accepted.expect("Accept failed");

    assert!(conn.peer_addr().is_ipv4());
    assert_eq!(conn.peer_addr().port(), port);
}

#[tokio::test]
async fn test_echo_session() {
    let (listener, port) = host_listener().await;

    let companion = tokio::spawn(async move {
        let mut conn = Connection::connect_localhost(port)
            .await
            .expect("Connect failed");
        serve_echo(&mut conn).await
    });

    let (host, _) = timeout(TEST_TIMEOUT, listener.accept())
        .await
        .expect("Test timed out")
        .expect("Accept failed");
    let (read_half, mut write_half) = host.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let requests = [
        r#"{"r":[2,2],"d":[1,2,3,4],"t":0}"#,
        r#"{"r":[],"d":["a"],"t":1}"#,
        r#"{"plain":"data"}"#,
    ];
    for request in requests {
        write_half
            .write_all(format!("{}\n", request).as_bytes())
            .await
            .expect("Write failed");

        let reply = timeout(TEST_TIMEOUT, lines.next_line())
            .await
            .expect("Test timed out")
            .expect("Read failed")
            .expect("Companion closed early");

        let sent: serde_json::Value = serde_json::from_str(request).unwrap();
        let got: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(got, sent);
    }

    // An undecodable line is skipped, not answered
    write_half
        .write_all(b"{\"r\":[-1],\"d\":[]}\n")
        .await
        .expect("Write failed");
    write_half
        .write_all(b"{\"r\":[1],\"d\":[\"z\"]}\n")
        .await
        .expect("Write failed");

    let reply = timeout(TEST_TIMEOUT, lines.next_line())
        .await
        .expect("Test timed out")
        .expect("Read failed")
        .expect("Companion closed early");
    let array = codec::decode_array(&reply).expect("reply is an array");
    assert_eq!(array.tag(), TypeTag::Numeric);
    assert_eq!(codec::decode(&reply).unwrap().encode(), reply);

    drop(write_half);

    let echoed = timeout(TEST_TIMEOUT, companion)
        .await
        .expect("Test timed out")
        .expect("Companion panicked")
        .expect("Echo failed");
    assert_eq!(echoed, 4);
}
