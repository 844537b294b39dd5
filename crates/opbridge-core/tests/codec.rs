//! Codec behavior: typed decode, source stamping, round-trip.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::{json, Number, Value};

use opbridge_core::protocol::{
    decode, decode_envelope, encode_envelope, peek_tag, Balance, Encoder, Envelope, ErrorAction,
    Message, MessageTag, ProtocolVersion, RawEvent,
};
use opbridge_core::ErrorKind;

#[test]
fn pay_invoice_decodes_invoice_id() {
    let raw = RawEvent::text(
        "https://game.example",
        r#"{"message":"operator_pay_invoice","data":{"invoice":"abc123"}}"#,
    );
    let env = decode(&raw, ProtocolVersion::V2).unwrap();
    assert_eq!(
        env.message,
        Message::PayInvoice {
            invoice: "abc123".into()
        }
    );
}

#[test]
fn demo_delta_accepted_nested_under_data() {
    let raw = RawEvent::new(
        "https://game.example",
        json!({ "message": "operator_demo_balance_update", "data": { "balanceInc": 250 } }),
    );
    let env = decode(&raw, ProtocolVersion::V1).unwrap();
    assert_eq!(env.message, Message::DemoBalanceUpdate { balance_inc: 250 });
}

#[test]
fn cancel_invoice_without_invoice_is_valid() {
    let raw = r#"{"message":"operator_cancel_invoice"}"#;
    let env = decode_envelope(raw, ProtocolVersion::V2).unwrap();
    assert_eq!(env.message, Message::CancelInvoice { invoice: None });
}

#[test]
fn missing_error_reads_as_null() {
    let env = decode_envelope(
        r#"{"message":"operator_handle_payment_error","data":{}}"#,
        ProtocolVersion::V2,
    )
    .unwrap();
    assert_eq!(env.message, Message::HandlePaymentError { error: Value::Null });
}

#[test]
fn invalid_ack_action_is_schema_error() {
    let err = decode_envelope(
        r#"{"message":"operator_payment_error_handled","action":"WAT"}"#,
        ProtocolVersion::V2,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(err.to_string().contains("action"));
}

#[test]
fn set_balance_reports_both_fields() {
    let err = decode_envelope(
        r#"{"message":"operator_set_balance","balance":"lots"}"#,
        ProtocolVersion::V2,
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("[balance] expected number, received string"), "{msg}");
    assert!(msg.contains("[currency] required"), "{msg}");
}

#[test]
fn malformed_json_string_is_decode_error() {
    let err = decode_envelope("{nope", ProtocolVersion::V2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn peek_ignores_non_envelopes() {
    let v = ProtocolVersion::V2;
    assert_eq!(peek_tag(&RawEvent::text("o", "hello"), v), None);
    assert_eq!(peek_tag(&RawEvent::new("o", json!([1, 2])), v), None);
    assert_eq!(peek_tag(&RawEvent::new("o", json!({ "message": 1 })), v), None);
    assert_eq!(
        peek_tag(&RawEvent::new("o", json!({ "message": "operator_close" })), v),
        Some(MessageTag::Close)
    );
}

#[test]
fn encoder_restamps_source() {
    let enc = Encoder::new("operator-host");
    let wire = enc
        .encode(Message::SetToken {
            token: "t-1".into(),
        })
        .unwrap();
    let v: Value = serde_json::from_str(&wire).unwrap();
    assert_eq!(v["message"], "operator_set_token");
    assert_eq!(v["token"], "t-1");
    assert_eq!(v["source"], "operator-host");

    let env = decode_envelope(&wire, ProtocolVersion::V2).unwrap();
    assert!(enc.is_own(&env));
    assert!(!Encoder::new("someone-else").is_own(&env));
}

#[test]
fn set_balance_wire_shape() {
    let env = Envelope::new(Message::SetBalance(Balance::new(500, "cents")));
    let v: Value = serde_json::from_str(&encode_envelope(&env).unwrap()).unwrap();
    assert_eq!(
        v,
        json!({ "message": "operator_set_balance", "balance": 500, "currency": "cents" })
    );
}

#[test]
fn fractional_balance_passes_through() {
    let raw = r#"{"message":"operator_set_balance","balance":12.75,"currency":"USD"}"#;
    let env = decode_envelope(raw, ProtocolVersion::V2).unwrap();
    let balance = match &env.message {
        Message::SetBalance(balance) => balance,
        other => panic!("expected set_balance, got {other:?}"),
    };
    assert_eq!(balance.balance.as_f64(), Some(12.75));

    let v: Value = serde_json::from_str(&encode_envelope(&env).unwrap()).unwrap();
    assert_eq!(v["balance"], json!(12.75));
}

#[test]
fn legacy_error_ack_carries_handled_flag() {
    let env = Envelope::new(Message::ErrorHandled {
        action: ErrorAction::Retry,
    });
    let v: Value = serde_json::from_str(&encode_envelope(&env).unwrap()).unwrap();
    assert_eq!(
        v,
        json!({ "message": "operator_error_handled", "action": "RETRY", "handled": true })
    );

    let env = decode_envelope(
        r#"{"message":"operator_payment_error_handled","action":"IGNORE"}"#,
        ProtocolVersion::V2,
    )
    .unwrap();
    let v: Value = serde_json::from_str(&encode_envelope(&env).unwrap()).unwrap();
    assert!(v.get("handled").is_none());
}

#[test]
fn legacy_error_ack_handled_must_be_boolean() {
    let err = decode_envelope(
        r#"{"message":"operator_error_handled","action":"RETRY","handled":"yes"}"#,
        ProtocolVersion::V1,
    )
    .unwrap_err();
    assert!(err.to_string().contains("[handled] expected boolean, received string"));

    let env = decode_envelope(
        r#"{"message":"operator_error_handled","action":"RETRY","handled":true}"#,
        ProtocolVersion::V1,
    )
    .unwrap();
    assert_eq!(
        env.message,
        Message::ErrorHandled {
            action: ErrorAction::Retry
        }
    );
}

#[test]
fn decode_inverts_encode() {
    let v1 = [
        Message::GetConfig,
        Message::SetConfig {
            config: json!({ "operatorId": "thndr", "nested": [1, 2] }),
        },
        Message::HandleError {
            error: json!({ "code": "E1" }),
        },
        Message::ErrorHandled {
            action: ErrorAction::Ignore,
        },
    ];
    let v2 = [
        Message::GetSdkVersion,
        Message::SetSdkVersion {
            version: "2.0.0".into(),
        },
        Message::SetBalance(Balance::new(-3, "cents")),
        Message::SetBalance(Balance::new(Number::from_f64(0.5).unwrap(), "USD")),
        Message::DemoBalanceUpdate { balance_inc: -500 },
        Message::PayInvoice {
            invoice: "lnbc1".into(),
        },
        Message::CancelInvoice {
            invoice: Some("lnbc1".into()),
        },
        Message::HandlePaymentError { error: Value::Null },
        Message::PaymentErrorHandled {
            action: ErrorAction::OperatorError,
        },
        Message::AnalyticsEvent {
            event_name: "game_start".into(),
        },
        Message::Redirect,
    ];

    let cases = v1
        .into_iter()
        .map(|m| (ProtocolVersion::V1, m))
        .chain(v2.into_iter().map(|m| (ProtocolVersion::V2, m)));
    for (version, message) in cases {
        for env in [
            Envelope::new(message.clone()),
            Envelope::with_source(message, "peer"),
        ] {
            let wire = encode_envelope(&env).unwrap();
            assert_eq!(decode_envelope(&wire, version).unwrap(), env, "wire={wire}");
        }
    }
}

#[test]
fn every_tag_string_is_unique_and_resolves() {
    for tag in MessageTag::ALL {
        assert_eq!(MessageTag::from_wire(tag.as_str()), Some(tag));
    }
    let mut strings: Vec<&str> = MessageTag::ALL.iter().map(|t| t.as_str()).collect();
    strings.sort_unstable();
    strings.dedup();
    assert_eq!(strings.len(), MessageTag::ALL.len());
}
