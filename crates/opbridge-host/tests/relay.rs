//! Relay connection handling, without a socket.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use opbridge_core::ErrorKind;
use opbridge_host::initialize;
use opbridge_host::transport::ws::{outbound, BridgeQuery, Relay};
use opbridge_host::transport::MessageBus;

use common::{session_config, RecordingHost, LOCATOR, ORIGIN};

fn query(origin: &str) -> BridgeQuery {
    BridgeQuery {
        locator: LOCATOR.into(),
        origin: origin.into(),
    }
}

fn frame(data: Value, origin: &str) -> String {
    json!({ "detail": { "data": data, "origin": origin } }).to_string()
}

#[tokio::test]
async fn relay_round_trip() {
    let bus = Arc::new(MessageBus::new());
    let (relay, mut surface) = Relay::attach(Arc::clone(&bus), &query(ORIGIN)).unwrap();
    let handle = initialize(session_config(), Arc::new(RecordingHost::default()), Arc::clone(&bus))
        .await
        .unwrap();

    let delivered = relay
        .inbound(&frame(json!({ "message": "operator_get_token" }), ORIGIN))
        .unwrap();
    assert_eq!(delivered, 1);

    let out = tokio::time::timeout(Duration::from_secs(2), outbound(&mut surface))
        .await
        .expect("no reply")
        .expect("surface detached")
        .unwrap();
    let out: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(out["detail"]["origin"], ORIGIN);
    let payload: Value = serde_json::from_str(out["detail"]["payload"].as_str().unwrap()).unwrap();
    assert_eq!(payload["message"], "operator_set_token");

    handle.teardown().await;
}

#[tokio::test]
async fn frame_claiming_another_origin_is_dropped() {
    let bus = Arc::new(MessageBus::new());
    let (relay, _surface) = Relay::attach(Arc::clone(&bus), &query("https://evil.test")).unwrap();
    let (_, mut observer) = bus.subscribe();

    let err = relay
        .inbound(&frame(json!({ "message": "operator_get_token" }), ORIGIN))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OriginMismatch);
    assert!(observer.try_recv().is_err());
}

#[tokio::test]
async fn second_relay_cannot_take_a_live_locator() {
    let bus = Arc::new(MessageBus::new());
    let host = Arc::new(RecordingHost::default());
    let (first, mut surface) = Relay::attach(Arc::clone(&bus), &query(ORIGIN)).unwrap();
    let handle = initialize(session_config(), host.clone(), Arc::clone(&bus))
        .await
        .unwrap();

    let err = Relay::attach(Arc::clone(&bus), &query(ORIGIN)).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Delivery);

    first
        .inbound(&frame(json!({ "message": "operator_get_token" }), ORIGIN))
        .unwrap();
    let out = tokio::time::timeout(Duration::from_secs(2), outbound(&mut surface))
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(out.contains("tok-1"));
    assert_eq!(host.token_calls(), 1);

    handle.teardown().await;
}

#[tokio::test]
async fn relay_detaches_when_dropped() {
    let bus = Arc::new(MessageBus::new());
    let (relay, surface) = Relay::attach(Arc::clone(&bus), &query(ORIGIN)).unwrap();
    drop(relay);
    drop(surface);
    assert!(!bus.has_surface(LOCATOR));
    assert!(Relay::attach(bus, &query(ORIGIN)).is_ok());
}

#[tokio::test]
async fn empty_locator_is_refused() {
    let bus = Arc::new(MessageBus::new());
    let q = BridgeQuery {
        locator: " ".into(),
        origin: ORIGIN.into(),
    };
    let err = Relay::attach(bus, &q).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[tokio::test]
async fn malformed_frame_is_decode_error() {
    let bus = Arc::new(MessageBus::new());
    let (relay, _surface) = Relay::attach(bus, &query(ORIGIN)).unwrap();
    assert_eq!(relay.inbound("{}").unwrap_err().kind(), ErrorKind::Decode);
}
