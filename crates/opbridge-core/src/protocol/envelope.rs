//! Typed envelope model.
//!
//! `Message` is the validated form of one wire envelope. Its variants mirror
//! `MessageTag` one to one; the per-tag fields are the only data downstream
//! code ever sees.

use serde_json::{Number, Value};

use super::tag::MessageTag;

/// Balance pair returned by the host ledger.
///
/// The amount is any JSON number, so fractional balances pass through as
/// given and integral ones keep their integer form on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub balance: Number,
    pub currency: String,
}

impl Balance {
    pub fn new(balance: impl Into<Number>, currency: impl Into<String>) -> Self {
        Self {
            balance: balance.into(),
            currency: currency.into(),
        }
    }
}

/// Outcome the host chose for a payment error reported by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorAction {
    Retry,
    GenericError,
    OperatorError,
    Ignore,
}

impl ErrorAction {
    /// The accepted wire values, for error messages.
    pub const EXPECTED: &'static str = "RETRY | GENERIC_ERROR | OPERATOR_ERROR | IGNORE";

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorAction::Retry => "RETRY",
            ErrorAction::GenericError => "GENERIC_ERROR",
            ErrorAction::OperatorError => "OPERATOR_ERROR",
            ErrorAction::Ignore => "IGNORE",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "RETRY" => Some(ErrorAction::Retry),
            "GENERIC_ERROR" => Some(ErrorAction::GenericError),
            "OPERATOR_ERROR" => Some(ErrorAction::OperatorError),
            "IGNORE" => Some(ErrorAction::Ignore),
            _ => None,
        }
    }
}

/// One validated protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    GetConfig,
    SetConfig { config: Value },
    GetSdkVersion,
    SetSdkVersion { version: String },
    GetToken,
    SetToken { token: String },
    GetBalance,
    SetBalance(Balance),
    /// Signed delta applied to the demo counter.
    DemoBalanceUpdate { balance_inc: i64 },
    PayInvoice { invoice: String },
    CancelInvoice { invoice: Option<String> },
    Redirect,
    Close,
    HandleError { error: Value },
    ErrorHandled { action: ErrorAction },
    HandlePaymentError { error: Value },
    PaymentErrorHandled { action: ErrorAction },
    AnalyticsEvent { event_name: String },
}

impl Message {
    pub fn tag(&self) -> MessageTag {
        match self {
            Message::GetConfig => MessageTag::GetConfig,
            Message::SetConfig { .. } => MessageTag::SetConfig,
            Message::GetSdkVersion => MessageTag::GetSdkVersion,
            Message::SetSdkVersion { .. } => MessageTag::SetSdkVersion,
            Message::GetToken => MessageTag::GetToken,
            Message::SetToken { .. } => MessageTag::SetToken,
            Message::GetBalance => MessageTag::GetBalance,
            Message::SetBalance(_) => MessageTag::SetBalance,
            Message::DemoBalanceUpdate { .. } => MessageTag::DemoBalanceUpdate,
            Message::PayInvoice { .. } => MessageTag::PayInvoice,
            Message::CancelInvoice { .. } => MessageTag::CancelInvoice,
            Message::Redirect => MessageTag::Redirect,
            Message::Close => MessageTag::Close,
            Message::HandleError { .. } => MessageTag::HandleError,
            Message::ErrorHandled { .. } => MessageTag::ErrorHandled,
            Message::HandlePaymentError { .. } => MessageTag::HandlePaymentError,
            Message::PaymentErrorHandled { .. } => MessageTag::PaymentErrorHandled,
            Message::AnalyticsEvent { .. } => MessageTag::AnalyticsEvent,
        }
    }
}

/// A message plus the identity of the peer that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub message: Message,
    /// Producer identity; used to drop looped-back echoes.
    pub source: Option<String>,
}

impl Envelope {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            source: None,
        }
    }

    pub fn with_source(message: Message, source: impl Into<String>) -> Self {
        Self {
            message,
            source: Some(source.into()),
        }
    }

    pub fn tag(&self) -> MessageTag {
        self.message.tag()
    }
}
