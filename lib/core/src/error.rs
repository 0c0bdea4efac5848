use thiserror::Error;

/// Unified client error type used across all modules.
///
/// Two failure planes are kept apart: [`ClientError::Transport`] means the
/// request never produced a JSON-RPC envelope (network down, timeout),
/// while [`ClientError::Server`] is a fault the server reported inside an
/// HTTP 200 envelope.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or HTTP failure before an envelope arrived.
    #[error("{0}")]
    Transport(String),

    /// Fault reported by the server inside a JSON-RPC envelope.
    #[error("{message}")]
    Server { name: String, message: String },

    /// The session cookie is no longer valid.
    #[error("session expired")]
    SessionExpired,

    /// Authentication failed or no session cookie could be obtained.
    #[error("{0}")]
    Auth(String),

    /// Local key-value storage failure.
    #[error("{0}")]
    Storage(String),

    /// Response body could not be decoded into the expected shape.
    #[error("{0}")]
    Decode(String),

    /// Input data is invalid.
    #[error("{0}")]
    Validation(String),

    /// Record does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl ClientError {
    /// True when the error should trigger a re-authentication retry.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_just_message() {
        assert_eq!(
            ClientError::Transport("connection refused".into()).to_string(),
            "connection refused"
        );
        assert_eq!(
            ClientError::Server {
                name: "odoo.exceptions.ValidationError".into(),
                message: "missing field".into(),
            }
            .to_string(),
            "missing field"
        );
        assert_eq!(ClientError::SessionExpired.to_string(), "session expired");
    }

    #[test]
    fn only_session_expired_retries() {
        assert!(ClientError::SessionExpired.is_session_expired());
        assert!(!ClientError::Transport("timeout".into()).is_session_expired());
        assert!(
            !ClientError::Server {
                name: "odoo.exceptions.AccessError".into(),
                message: "denied".into(),
            }
            .is_session_expired()
        );
    }
}
