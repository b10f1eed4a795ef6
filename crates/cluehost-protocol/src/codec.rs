//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The protocol layer doesn't care HOW messages are serialized — anything
//! implementing [`Codec`] will do. [`JsonCodec`] is the only shipped
//! implementation; the protocol travels as JSON text frames so it can be
//! inspected in browser DevTools.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Converts between Rust types and text frames.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError>;

    /// Deserializes a text frame back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the frame is malformed,
    /// incomplete, or doesn't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ## Example
///
/// ```rust
/// use cluehost_protocol::{Codec, JsonCodec, ServerEvent};
///
/// let codec = JsonCodec;
/// let text = codec.encode(&ServerEvent::GameReset).unwrap();
/// assert_eq!(text, r#"{"type":"gameReset"}"#);
///
/// let decoded: ServerEvent = codec.decode(&text).unwrap();
/// assert_eq!(decoded, ServerEvent::GameReset);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
