//! Per-tag shape validation.
//!
//! The `message` discriminator selects the variant; the remaining fields are
//! checked against that variant and every problem is collected, so a single
//! rejection names all offending paths at once.

use serde_json::{Map, Number, Value};

use crate::error::{BridgeError, Result, SchemaError, SchemaIssue};

use super::envelope::{Balance, Envelope, ErrorAction, Message};
use super::tag::{MessageTag, ProtocolVersion};

/// Validate an already-parsed JSON value into an `Envelope`.
///
/// A non-object root or a malformed `message` is a schema failure; a
/// well-formed tag outside `version`'s vocabulary is a decode failure.
pub fn validate(root: &Value, version: ProtocolVersion) -> Result<Envelope> {
    let Some(obj) = root.as_object() else {
        return Err(single("root", expected("object", root)));
    };

    let tag_str = match obj.get("message") {
        None => return Err(single("message", "required".into())),
        Some(Value::String(s)) => s.as_str(),
        Some(other) => return Err(single("message", expected("string", other))),
    };
    let tag = version.lookup(tag_str).ok_or_else(|| {
        BridgeError::Decode(format!(
            "unknown tag {tag_str:?} for protocol {}",
            version.as_str()
        ))
    })?;

    let mut c = Checker::new(obj);
    let source = c.opt_string(&["source"]);
    let message = c.message(tag);

    if !c.issues.is_empty() {
        return Err(BridgeError::Schema(SchemaError { issues: c.issues }));
    }
    // Every branch of `message` pushes an issue before returning None.
    let message =
        message.ok_or_else(|| BridgeError::Internal("schema produced no message".into()))?;
    Ok(Envelope { message, source })
}

fn single(path: &str, message: String) -> BridgeError {
    BridgeError::Schema(SchemaError {
        issues: vec![SchemaIssue {
            path: path.to_string(),
            message,
        }],
    })
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(want: &str, got: &Value) -> String {
    format!("expected {want}, received {}", kind_of(got))
}

/// Integer view of a JSON number, accepting integral floats (`-500.0`).
fn as_integer(v: &Value) -> Option<i64> {
    if let Some(i) = v.as_i64() {
        return Some(i);
    }
    let f = v.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

enum Lookup<'v> {
    Missing,
    Found(&'v Value),
    /// An intermediate segment exists but is not an object; already reported.
    Blocked,
}

struct Checker<'v> {
    root: &'v Map<String, Value>,
    issues: Vec<SchemaIssue>,
}

impl<'v> Checker<'v> {
    fn new(root: &'v Map<String, Value>) -> Self {
        Self {
            root,
            issues: Vec::new(),
        }
    }

    fn push(&mut self, path: &[&str], message: String) {
        self.issues.push(SchemaIssue {
            path: path.join("."),
            message,
        });
    }

    fn lookup(&mut self, path: &[&str]) -> Lookup<'v> {
        let mut cur = self.root;
        for (i, seg) in path.iter().enumerate() {
            let Some(v) = cur.get(*seg) else {
                return Lookup::Missing;
            };
            if i + 1 == path.len() {
                return Lookup::Found(v);
            }
            match v.as_object() {
                Some(o) => cur = o,
                None => {
                    let msg = expected("object", v);
                    self.push(&path[..=i], msg);
                    return Lookup::Blocked;
                }
            }
        }
        Lookup::Missing
    }

    fn string(&mut self, path: &[&str]) -> Option<String> {
        match self.lookup(path) {
            Lookup::Found(Value::String(s)) => Some(s.clone()),
            Lookup::Found(other) => {
                let msg = expected("string", other);
                self.push(path, msg);
                None
            }
            Lookup::Missing => {
                self.push(path, "required".into());
                None
            }
            Lookup::Blocked => None,
        }
    }

    fn opt_string(&mut self, path: &[&str]) -> Option<String> {
        match self.lookup(path) {
            Lookup::Found(Value::String(s)) => Some(s.clone()),
            Lookup::Found(other) => {
                let msg = expected("string", other);
                self.push(path, msg);
                None
            }
            Lookup::Missing | Lookup::Blocked => None,
        }
    }

    fn integer(&mut self, path: &[&str]) -> Option<i64> {
        match self.lookup(path) {
            Lookup::Found(v) => match as_integer(v) {
                Some(i) => Some(i),
                None => {
                    let msg = expected("integer", v);
                    self.push(path, msg);
                    None
                }
            },
            Lookup::Missing => {
                self.push(path, "required".into());
                None
            }
            Lookup::Blocked => None,
        }
    }

    fn number(&mut self, path: &[&str]) -> Option<Number> {
        match self.lookup(path) {
            Lookup::Found(Value::Number(n)) => Some(n.clone()),
            Lookup::Found(other) => {
                let msg = expected("number", other);
                self.push(path, msg);
                None
            }
            Lookup::Missing => {
                self.push(path, "required".into());
                None
            }
            Lookup::Blocked => None,
        }
    }

    fn opt_bool(&mut self, path: &[&str]) -> Option<bool> {
        match self.lookup(path) {
            Lookup::Found(Value::Bool(b)) => Some(*b),
            Lookup::Found(other) => {
                let msg = expected("boolean", other);
                self.push(path, msg);
                None
            }
            Lookup::Missing | Lookup::Blocked => None,
        }
    }

    /// Required key, any value (including null).
    fn present(&mut self, path: &[&str]) -> Option<Value> {
        match self.lookup(path) {
            Lookup::Found(v) => Some(v.clone()),
            Lookup::Missing => {
                self.push(path, "required".into());
                None
            }
            Lookup::Blocked => None,
        }
    }

    /// Required object; children are only checked when this returns true.
    fn object(&mut self, path: &[&str]) -> bool {
        match self.lookup(path) {
            Lookup::Found(Value::Object(_)) => true,
            Lookup::Found(other) => {
                let msg = expected("object", other);
                self.push(path, msg);
                false
            }
            Lookup::Missing => {
                self.push(path, "required".into());
                false
            }
            Lookup::Blocked => false,
        }
    }

    fn action(&mut self, path: &[&str]) -> Option<ErrorAction> {
        let raw = self.string(path)?;
        match ErrorAction::from_wire(&raw) {
            Some(a) => Some(a),
            None => {
                let msg = format!("invalid enum value {raw:?}, expected {}", ErrorAction::EXPECTED);
                self.push(path, msg);
                None
            }
        }
    }

    /// `data.error` may be absent; absence reads as null.
    fn data_error(&mut self) -> Option<Value> {
        if !self.object(&["data"]) {
            return None;
        }
        match self.lookup(&["data", "error"]) {
            Lookup::Found(v) => Some(v.clone()),
            _ => Some(Value::Null),
        }
    }

    fn message(&mut self, tag: MessageTag) -> Option<Message> {
        let m = match tag {
            MessageTag::GetConfig => Message::GetConfig,
            MessageTag::SetConfig => Message::SetConfig {
                config: self.present(&["config"])?,
            },
            MessageTag::GetSdkVersion => Message::GetSdkVersion,
            MessageTag::SetSdkVersion => Message::SetSdkVersion {
                version: self.string(&["version"])?,
            },
            MessageTag::GetToken => Message::GetToken,
            MessageTag::SetToken => Message::SetToken {
                token: self.string(&["token"])?,
            },
            MessageTag::GetBalance => Message::GetBalance,
            MessageTag::SetBalance => {
                let balance = self.number(&["balance"]);
                let currency = self.string(&["currency"]);
                Message::SetBalance(Balance {
                    balance: balance?,
                    currency: currency?,
                })
            }
            MessageTag::DemoBalanceUpdate => {
                // Surfaces send the delta at top level; older builds nest it.
                let path: &[&str] = if self.root.contains_key("balanceInc") {
                    &["balanceInc"]
                } else if matches!(self.lookup(&["data", "balanceInc"]), Lookup::Found(_)) {
                    &["data", "balanceInc"]
                } else {
                    &["balanceInc"]
                };
                Message::DemoBalanceUpdate {
                    balance_inc: self.integer(path)?,
                }
            }
            MessageTag::PayInvoice => {
                if !self.object(&["data"]) {
                    return None;
                }
                Message::PayInvoice {
                    invoice: self.string(&["data", "invoice"])?,
                }
            }
            MessageTag::CancelInvoice => {
                let invoice = if self.root.contains_key("invoice") {
                    self.opt_string(&["invoice"])
                } else {
                    self.opt_string(&["data", "invoice"])
                };
                Message::CancelInvoice { invoice }
            }
            MessageTag::Redirect => Message::Redirect,
            MessageTag::Close => Message::Close,
            MessageTag::HandleError => Message::HandleError {
                error: self.data_error()?,
            },
            MessageTag::ErrorHandled => {
                // `handled` is the legacy flag; only its type is checked.
                self.opt_bool(&["handled"]);
                Message::ErrorHandled {
                    action: self.action(&["action"])?,
                }
            }
            MessageTag::HandlePaymentError => Message::HandlePaymentError {
                error: self.data_error()?,
            },
            MessageTag::PaymentErrorHandled => Message::PaymentErrorHandled {
                action: self.action(&["action"])?,
            },
            MessageTag::AnalyticsEvent => {
                if !self.object(&["data"]) {
                    return None;
                }
                Message::AnalyticsEvent {
                    event_name: self.string(&["data", "eventName"])?,
                }
            }
        };
        Some(m)
    }
}
