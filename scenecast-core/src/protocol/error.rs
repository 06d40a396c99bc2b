use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame is not JSON at all. Connections sending these are closed.
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Valid JSON with an unknown `type` or bad fields. Logged and dropped.
    #[error("unsupported message: {0}")]
    Unsupported(#[source] serde_json::Error),

    #[error("empty data channel message")]
    Empty,

    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),

    #[error("truncated payload: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("payload is not valid UTF-16")]
    InvalidText,
}

impl ProtocolError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, ProtocolError::Malformed(_))
    }
}
