//! Wire tag vocabulary.
//!
//! Tag strings are shared with independently deployed surfaces and must never
//! change. Every string appears exactly once, so one enum serves both
//! directions; `ProtocolVersion` decides which tags a session speaks.

use serde::Deserialize;

/// Every tag known to any protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    GetConfig,
    SetConfig,
    GetSdkVersion,
    SetSdkVersion,
    GetToken,
    SetToken,
    GetBalance,
    SetBalance,
    DemoBalanceUpdate,
    PayInvoice,
    CancelInvoice,
    Redirect,
    Close,
    HandleError,
    ErrorHandled,
    HandlePaymentError,
    PaymentErrorHandled,
    AnalyticsEvent,
}

impl MessageTag {
    pub const ALL: [MessageTag; 18] = [
        MessageTag::GetConfig,
        MessageTag::SetConfig,
        MessageTag::GetSdkVersion,
        MessageTag::SetSdkVersion,
        MessageTag::GetToken,
        MessageTag::SetToken,
        MessageTag::GetBalance,
        MessageTag::SetBalance,
        MessageTag::DemoBalanceUpdate,
        MessageTag::PayInvoice,
        MessageTag::CancelInvoice,
        MessageTag::Redirect,
        MessageTag::Close,
        MessageTag::HandleError,
        MessageTag::ErrorHandled,
        MessageTag::HandlePaymentError,
        MessageTag::PaymentErrorHandled,
        MessageTag::AnalyticsEvent,
    ];

    /// Wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageTag::GetConfig => "operator_get_config",
            MessageTag::SetConfig => "operator_set_config",
            MessageTag::GetSdkVersion => "operator_get_sdk_version",
            MessageTag::SetSdkVersion => "operator_set_sdk_version",
            MessageTag::GetToken => "operator_get_token",
            MessageTag::SetToken => "operator_set_token",
            MessageTag::GetBalance => "operator_get_balance",
            MessageTag::SetBalance => "operator_set_balance",
            MessageTag::DemoBalanceUpdate => "operator_demo_balance_update",
            MessageTag::PayInvoice => "operator_pay_invoice",
            MessageTag::CancelInvoice => "operator_cancel_invoice",
            MessageTag::Redirect => "operator_redirect",
            MessageTag::Close => "operator_close",
            MessageTag::HandleError => "operator_handle_error",
            MessageTag::ErrorHandled => "operator_error_handled",
            MessageTag::HandlePaymentError => "operator_handle_payment_error",
            MessageTag::PaymentErrorHandled => "operator_payment_error_handled",
            MessageTag::AnalyticsEvent => "operator_analytics_event",
        }
    }

    /// Exact-match lookup. No case folding, no prefixes.
    pub fn from_wire(s: &str) -> Option<Self> {
        MessageTag::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Strict, versioned vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// Legacy operator SDK: config push, `HANDLE_ERROR`.
    V1,
    /// Current: SDK version query, payment error handshake, analytics.
    #[default]
    V2,
}

const V1_TAGS: &[MessageTag] = &[
    MessageTag::GetConfig,
    MessageTag::SetConfig,
    MessageTag::GetToken,
    MessageTag::SetToken,
    MessageTag::GetBalance,
    MessageTag::SetBalance,
    MessageTag::DemoBalanceUpdate,
    MessageTag::PayInvoice,
    MessageTag::CancelInvoice,
    MessageTag::Redirect,
    MessageTag::Close,
    MessageTag::HandleError,
    MessageTag::ErrorHandled,
];

const V2_TAGS: &[MessageTag] = &[
    MessageTag::GetSdkVersion,
    MessageTag::SetSdkVersion,
    MessageTag::GetToken,
    MessageTag::SetToken,
    MessageTag::GetBalance,
    MessageTag::SetBalance,
    MessageTag::DemoBalanceUpdate,
    MessageTag::PayInvoice,
    MessageTag::CancelInvoice,
    MessageTag::Redirect,
    MessageTag::Close,
    MessageTag::HandlePaymentError,
    MessageTag::PaymentErrorHandled,
    MessageTag::AnalyticsEvent,
];

impl ProtocolVersion {
    /// Tags that belong to this vocabulary (both directions).
    pub fn tags(self) -> &'static [MessageTag] {
        match self {
            ProtocolVersion::V1 => V1_TAGS,
            ProtocolVersion::V2 => V2_TAGS,
        }
    }

    pub fn contains(self, tag: MessageTag) -> bool {
        self.tags().contains(&tag)
    }

    /// Resolve a wire string within this vocabulary only.
    pub fn lookup(self, s: &str) -> Option<MessageTag> {
        MessageTag::from_wire(s).filter(|t| self.contains(*t))
    }

    /// Tag used to acknowledge an error handshake in this vocabulary.
    pub fn error_ack_tag(self) -> MessageTag {
        match self {
            ProtocolVersion::V1 => MessageTag::ErrorHandled,
            ProtocolVersion::V2 => MessageTag::PaymentErrorHandled,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolVersion::V1 => "v1",
            ProtocolVersion::V2 => "v2",
        }
    }
}
