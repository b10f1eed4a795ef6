//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into a text frame).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a text frame into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `"type"` tag, or a
    /// missing required field such as the room key.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
