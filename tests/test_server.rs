//! End-to-end scenarios over loopback TCP.

use std::net::SocketAddr;

use pinserve::config::ServerConfig;
use pinserve::control::{Controller, Targets};
use pinserve::hardware::{HardwareCall, MemoryHardware, PinId, SensorId};
use pinserve::router::{Action, RouteTable};
use pinserve::server::Server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const TARGETS: Targets = Targets {
    output_pin: PinId(21),
    sensor: SensorId(0),
};

async fn start(routes: RouteTable) -> (Server<MemoryHardware>, MemoryHardware) {
    let hw = MemoryHardware::new().with_sensor(SensorId(0), 48.3);
    let controller = Controller::new(routes, TARGETS, hw.clone()).unwrap();
    let cfg = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        ..ServerConfig::default()
    };
    let server = Server::bind(&cfg, controller).await.unwrap();
    (server, hw)
}

async fn send(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    if request.is_empty() {
        stream.shutdown().await.unwrap();
    } else {
        stream.write_all(request).await.unwrap();
    }
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

/// Serves exactly one connection while the client sends `request`.
async fn exchange(server: &mut Server<MemoryHardware>, request: &[u8]) -> String {
    let addr = server.local_addr().unwrap();
    let (served, response) = tokio::join!(server.serve_one(), send(addr, request));
    served.unwrap();
    response
}

#[tokio::test]
async fn test_turn_on() {
    let (mut server, hw) = start(RouteTable::default()).await;

    let response = exchange(&mut server, b"GET /on HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.0 200 OK"));
    assert!(response.contains("turned on"));
    assert_eq!(hw.action_calls(), vec![HardwareCall::SetOutput(PinId(21), true)]);
    assert_eq!(hw.level(PinId(21)), Some(true));
}

#[tokio::test]
async fn test_turn_off() {
    let (mut server, hw) = start(RouteTable::default()).await;

    let response = exchange(&mut server, b"GET /off HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.0 200 OK"));
    assert!(response.contains("turned off"));
    assert_eq!(hw.action_calls(), vec![HardwareCall::SetOutput(PinId(21), false)]);
}

#[tokio::test]
async fn test_unknown_path() {
    let (mut server, hw) = start(RouteTable::default()).await;

    let response = exchange(&mut server, b"GET /nonexistent HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, "HTTP/1.0 404 Not Found\r\n");
    assert!(hw.action_calls().is_empty());
}

#[tokio::test]
async fn test_client_closes_without_sending() {
    let (mut server, hw) = start(RouteTable::default()).await;

    let response = exchange(&mut server, b"").await;

    assert_eq!(response, "HTTP/1.0 404 Not Found\r\n");
    assert!(hw.action_calls().is_empty());

    // The server is still serving.
    let response = exchange(&mut server, b"GET /on HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.0 200 OK"));
}

#[tokio::test]
async fn test_sensor_fault_returns_no_stale_reading() {
    let (mut server, hw) = start(RouteTable::default()).await;

    let response = exchange(&mut server, b"GET /temp HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.0 200 OK"));
    assert!(response.contains("48.3"));

    hw.fail_sensor(SensorId(0), "thermal zone unavailable");
    let response = exchange(&mut server, b"GET /temp HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, "HTTP/1.0 500 Internal Server Error\r\n");
    assert!(!response.contains("48.3"));
}

#[tokio::test]
async fn test_cleared_pin_fault_restores_switching() {
    let (mut server, hw) = start(RouteTable::default()).await;

    hw.fail_pin(PinId(21), "line busy");
    let response = exchange(&mut server, b"GET /on HTTP/1.1\r\n\r\n").await;
    assert_eq!(response, "HTTP/1.0 500 Internal Server Error\r\n");
    assert_eq!(hw.level(PinId(21)), None);

    hw.clear_faults();
    let response = exchange(&mut server, b"GET /on HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.0 200 OK"));
    assert_eq!(hw.level(PinId(21)), Some(true));
}

#[tokio::test]
async fn test_each_request_reads_the_sensor_afresh() {
    let (mut server, hw) = start(RouteTable::default()).await;

    let response = exchange(&mut server, b"GET /temp HTTP/1.1\r\n\r\n").await;
    assert!(response.contains("<h1>48.3</h1>"));

    hw.set_sensor(SensorId(0), 52.0);
    let response = exchange(&mut server, b"GET /temp HTTP/1.1\r\n\r\n").await;
    assert!(response.contains("<h1>52.0</h1>"));
}

#[tokio::test]
async fn test_sensor_only_table_ignores_path() {
    let (mut server, hw) = start(RouteTable::new(vec![]).with_fallback(Action::ReadSensor)).await;

    let response = exchange(&mut server, b"GET /whatever HTTP/1.1\r\n\r\n").await;

    assert!(response.contains("<h1>48.3</h1>"));
    assert_eq!(hw.action_calls(), vec![HardwareCall::ReadSensor(SensorId(0))]);
}

#[tokio::test]
async fn test_hardware_calls_follow_connection_order() {
    let (mut server, hw) = start(RouteTable::default()).await;

    for path in ["/on", "/off", "/on", "/on"] {
        let request = format!("GET {} HTTP/1.1\r\n\r\n", path);
        let response = exchange(&mut server, request.as_bytes()).await;
        assert!(response.starts_with("HTTP/1.0 200 OK"));
    }

    assert_eq!(
        hw.action_calls(),
        vec![
            HardwareCall::SetOutput(PinId(21), true),
            HardwareCall::SetOutput(PinId(21), false),
            HardwareCall::SetOutput(PinId(21), true),
            HardwareCall::SetOutput(PinId(21), true),
        ]
    );
    assert_eq!(hw.level(PinId(21)), Some(true));
}

#[tokio::test]
async fn test_post_is_not_routed() {
    let (mut server, hw) = start(RouteTable::default()).await;

    let response = exchange(&mut server, b"POST /on HTTP/1.1\r\nContent-Length: 0\r\n\r\n").await;

    assert_eq!(response, "HTTP/1.0 404 Not Found\r\n");
    assert!(hw.action_calls().is_empty());
}

#[tokio::test]
async fn test_bind_rejects_bad_address() {
    let controller = Controller::new(RouteTable::default(), TARGETS, MemoryHardware::new()).unwrap();
    let cfg = ServerConfig {
        listen_addr: "not-an-address".to_string(),
        ..ServerConfig::default()
    };

    assert!(Server::bind(&cfg, controller).await.is_err());
}
