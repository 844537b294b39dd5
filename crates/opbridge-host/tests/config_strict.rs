#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use opbridge_core::protocol::ProtocolVersion;
use opbridge_core::ErrorKind;
use opbridge_host::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
session:
  operator_id: "thndr"
  target_origin: "https://game.example"
  surface_locator: "games_iframe"
  demo: { initial_balanse: 100 } # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
session:
  operator_id: "thndr"
  target_origin: "https://game.example"
  surface_locator: "games_iframe"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.session.source, "opbridge-host");
    assert_eq!(cfg.session.protocol, ProtocolVersion::V2);
    assert_eq!(cfg.session.sdk_version, "2.0.0");
    assert_eq!(cfg.session.surface_wait_ms, 10000);
    assert!(!cfg.session.logging);
    assert!(cfg.session.demo.is_none());
    assert_eq!(cfg.bridge.listen, "127.0.0.1:8080");
}

#[test]
fn full_config_with_demo_and_legacy_protocol() {
    let ok = r#"
version: 1
session:
  operator_id: "thndr"
  game_id: "solitaire"
  target_origin: "http://localhost:3000"
  surface_locator: "games_iframe"
  source: "operator-host"
  protocol: v1
  logging: true
  surface_wait_ms: 0
  demo: {}
bridge:
  listen: "127.0.0.1:9000"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.session.protocol, ProtocolVersion::V1);
    assert_eq!(cfg.session.source, "operator-host");
    assert_eq!(cfg.session.demo.as_ref().unwrap().initial_balance, 20000);
}

fn with_origin(origin: &str) -> String {
    format!(
        r#"
version: 1
session:
  operator_id: "thndr"
  target_origin: "{origin}"
  surface_locator: "games_iframe"
"#
    )
}

#[test]
fn origin_with_trailing_slash_rejected() {
    let err = config::load_from_str(&with_origin("https://game.example/")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn origin_with_path_rejected() {
    let err = config::load_from_str(&with_origin("https://game.example/play")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn wildcard_origin_rejected() {
    let err = config::load_from_str(&with_origin("*")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn non_http_origin_rejected() {
    let err = config::load_from_str(&with_origin("file:///tmp")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn origin_with_port_accepted() {
    let cfg = config::load_from_str(&with_origin("https://game.example:8443")).unwrap();
    assert_eq!(cfg.session.target_origin, "https://game.example:8443");
}

#[test]
fn unsupported_version_rejected() {
    let bad = r#"
version: 2
session:
  operator_id: "thndr"
  target_origin: "https://game.example"
  surface_locator: "games_iframe"
"#;
    let err = config::load_from_str(bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
}

#[test]
fn surface_wait_is_bounded() {
    let bad = r#"
version: 1
session:
  operator_id: "thndr"
  target_origin: "https://game.example"
  surface_locator: "games_iframe"
  surface_wait_ms: 60001
"#;
    let err = config::load_from_str(bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn empty_locator_rejected() {
    let bad = r#"
version: 1
session:
  operator_id: "thndr"
  target_origin: "https://game.example"
  surface_locator: "  "
"#;
    let err = config::load_from_str(bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn unknown_protocol_rejected() {
    let bad = r#"
version: 1
session:
  operator_id: "thndr"
  target_origin: "https://game.example"
  surface_locator: "games_iframe"
  protocol: v3
"#;
    let err = config::load_from_str(bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn bad_listen_address_rejected() {
    let bad = r#"
version: 1
session:
  operator_id: "thndr"
  target_origin: "https://game.example"
  surface_locator: "games_iframe"
bridge:
  listen: "not-an-addr"
"#;
    let err = config::load_from_str(bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn surface_url_carries_session_identity() {
    let mut s = config::SessionConfig::new("thndr", "https://game.example", "games_iframe");
    s.game_id = Some("solitaire".into());
    let url = s.surface_url("en", "desktop").unwrap();
    assert_eq!(
        url.as_str(),
        "https://game.example/?operatorId=thndr&gameId=solitaire&language=en&platform=desktop"
    );
}

#[test]
fn config_payload_uses_wire_names() {
    let s = config::SessionConfig::new("thndr", "https://game.example", "games_iframe");
    let v = s.config_payload();
    assert_eq!(v["operatorId"], "thndr");
    assert_eq!(v["targetOrigin"], "https://game.example");
    assert_eq!(v["protocol"], "v2");
}
