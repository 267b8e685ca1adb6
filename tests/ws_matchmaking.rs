//! End-to-end matchmaking over real WebSocket connections.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use banter_gateway::app_state::AppState;
use banter_gateway::config::GatewayConfig;
use banter_gateway::server::build_app;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn spawn_server(config: GatewayConfig) -> SocketAddr {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let app = build_app(AppState::new(config));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn ws_url(addr: SocketAddr, params: &[(&str, &str)]) -> String {
    let base = format!("ws://{addr}/ws");
    let Ok(url) = reqwest::Url::parse_with_params(&base, params) else {
        panic!("bad url");
    };
    url.to_string()
}

async fn open(addr: SocketAddr, params: &[(&str, &str)]) -> Ws {
    let Ok((ws, _)) = connect_async(ws_url(addr, params)).await else {
        panic!("websocket connect failed");
    };
    ws
}

/// Next JSON text frame, skipping control frames.
async fn recv_json(ws: &mut Ws) -> Value {
    loop {
        let Ok(frame) = tokio::time::timeout(WAIT, ws.next()).await else {
            panic!("timed out waiting for a message");
        };
        match frame {
            Some(Ok(Message::Text(text))) => {
                let Ok(value) = serde_json::from_str(text.as_str()) else {
                    panic!("server sent non-JSON text");
                };
                return value;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

/// Waits until the server closes the connection.
async fn expect_closed(ws: &mut Ws) {
    loop {
        let Ok(frame) = tokio::time::timeout(WAIT, ws.next()).await else {
            panic!("connection was not closed");
        };
        match frame {
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
            Some(Ok(Message::Text(text))) => panic!("unexpected message {}", text.as_str()),
            Some(Ok(_)) => {}
        }
    }
}

async fn send_json(ws: &mut Ws, value: Value) {
    if ws.send(Message::text(value.to_string())).await.is_err() {
        panic!("send failed");
    }
}

async fn health(addr: SocketAddr) -> Value {
    let Ok(response) = reqwest::get(format!("http://{addr}/healthcheck")).await else {
        panic!("health request failed");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("health body not JSON");
    };
    body
}

#[tokio::test]
async fn lone_client_waits_with_null_partner() {
    let addr = spawn_server(GatewayConfig::default()).await;
    let mut a = open(addr, &[("id", "a")]).await;

    assert_eq!(
        recv_json(&mut a).await,
        json!({"id": "a", "partnerId": "Null", "matchedInterest": "Null"})
    );
}

#[tokio::test]
async fn generated_id_when_none_supplied() {
    let addr = spawn_server(GatewayConfig::default()).await;
    let mut a = open(addr, &[]).await;

    let notice = recv_json(&mut a).await;
    let Some(id) = notice["id"].as_str() else {
        panic!("missing id");
    };
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn two_clients_pair_and_relay_both_ways() {
    let addr = spawn_server(GatewayConfig::default()).await;
    let mut a = open(addr, &[("id", "a")]).await;
    recv_json(&mut a).await;

    let mut b = open(addr, &[("id", "b")]).await;
    assert_eq!(
        recv_json(&mut b).await,
        json!({"id": "b", "partnerId": "a", "matchedInterest": "Null"})
    );
    assert_eq!(
        recv_json(&mut a).await,
        json!({"id": "a", "partnerId": "b", "matchedInterest": "Null"})
    );

    send_json(&mut a, json!({"text": "hi b"})).await;
    assert_eq!(recv_json(&mut b).await, json!({"text": "hi b"}));

    send_json(&mut b, json!({"text": "hi a", "typing": "false"})).await;
    assert_eq!(
        recv_json(&mut a).await,
        json!({"text": "hi a", "typing": "false"})
    );
}

#[tokio::test]
async fn interest_match_uses_first_shared_tag() {
    let addr = spawn_server(GatewayConfig::default()).await;
    let mut a = open(addr, &[("id", "a"), ("interests", r#"["music"]"#)]).await;
    recv_json(&mut a).await;

    let mut b = open(addr, &[("id", "b"), ("interests", r#"["music","sports"]"#)]).await;
    assert_eq!(
        recv_json(&mut b).await,
        json!({"id": "b", "partnerId": "a", "matchedInterest": "music"})
    );
    assert_eq!(
        recv_json(&mut a).await,
        json!({"id": "a", "partnerId": "b", "matchedInterest": "music"})
    );

    let stats = health(addr).await;
    assert_eq!(stats["paired_clients"], 2);
    assert_eq!(stats["waiting_by_interest"], json!({}));
}

#[tokio::test]
async fn malformed_interests_match_unconditionally() {
    let addr = spawn_server(GatewayConfig::default()).await;
    let mut a = open(addr, &[("id", "a")]).await;
    recv_json(&mut a).await;

    let mut b = open(addr, &[("id", "b"), ("interests", "music")]).await;
    assert_eq!(recv_json(&mut b).await["partnerId"], "a");
}

#[tokio::test]
async fn repeated_query_keys_use_first_value() {
    let addr = spawn_server(GatewayConfig::default()).await;
    let mut a = open(addr, &[("id", "a"), ("interests", r#"["music"]"#)]).await;
    recv_json(&mut a).await;

    let mut b = open(
        addr,
        &[
            ("id", "b"),
            ("interests", r#"["music"]"#),
            ("id", "ignored"),
            ("interests", r#"["sports"]"#),
        ],
    )
    .await;
    assert_eq!(
        recv_json(&mut b).await,
        json!({"id": "b", "partnerId": "a", "matchedInterest": "music"})
    );
}

#[tokio::test]
async fn disconnect_closes_partner() {
    let addr = spawn_server(GatewayConfig::default()).await;
    let mut a = open(addr, &[("id", "a")]).await;
    recv_json(&mut a).await;
    let mut b = open(addr, &[("id", "b")]).await;
    recv_json(&mut b).await;
    recv_json(&mut a).await;

    drop(a);
    expect_closed(&mut b).await;

    let stats = health(addr).await;
    assert_eq!(stats["connected_clients"], 0);
}

#[tokio::test]
async fn malformed_frame_ends_session() {
    let addr = spawn_server(GatewayConfig::default()).await;
    let mut a = open(addr, &[("id", "a")]).await;
    recv_json(&mut a).await;
    let mut b = open(addr, &[("id", "b")]).await;
    recv_json(&mut b).await;
    recv_json(&mut a).await;

    send_json(&mut a, json!({"typing": true})).await;

    expect_closed(&mut a).await;
    expect_closed(&mut b).await;
}

#[tokio::test]
async fn reconnect_replaces_previous_connection() {
    let addr = spawn_server(GatewayConfig::default()).await;
    let mut first = open(addr, &[("id", "a")]).await;
    recv_json(&mut first).await;

    let mut second = open(addr, &[("id", "a")]).await;
    assert_eq!(
        recv_json(&mut second).await,
        json!({"id": "a", "partnerId": "Null", "matchedInterest": "Null"})
    );
    expect_closed(&mut first).await;

    let stats = health(addr).await;
    assert_eq!(stats["connected_clients"], 1);
    assert_eq!(stats["waiting_unconditional"], 1);

    // The replacement is still matchable.
    let mut b = open(addr, &[("id", "b")]).await;
    assert_eq!(recv_json(&mut b).await["partnerId"], "a");
    assert_eq!(recv_json(&mut second).await["partnerId"], "b");
}

#[tokio::test]
async fn oversized_id_is_rejected_before_upgrade() {
    let config = GatewayConfig {
        max_client_id_len: 8,
        ..GatewayConfig::default()
    };
    let addr = spawn_server(config).await;

    match connect_async(ws_url(addr, &[("id", "much-too-long-id")])).await {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 400);
        }
        Ok(_) => panic!("upgrade should have been refused"),
        Err(other) => panic!("unexpected error: {other}"),
    }
}
