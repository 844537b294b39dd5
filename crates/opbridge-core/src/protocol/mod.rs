//! Protocol modules.
//!
//! - `tag`: the closed tag vocabulary and versioned membership.
//! - `envelope`: the typed, validated message model.
//! - `schema`: per-tag shape validation from untyped JSON.
//! - `codec`: raw event preprocessing, decode, and source-stamping encode.
//!
//! Everything downstream of `codec::decode` works on `Envelope`, never on raw
//! JSON values.

pub mod codec;
pub mod envelope;
pub mod schema;
pub mod tag;

pub use codec::{
    decode, decode_envelope, decode_value, encode_envelope, peek_tag, Encoder, RawEvent,
};
pub use envelope::{Balance, Envelope, ErrorAction, Message};
pub use tag::{MessageTag, ProtocolVersion};
