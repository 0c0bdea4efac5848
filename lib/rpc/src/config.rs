//! Client connection settings.

use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const ATTACHMENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for one server.
///
/// The stored credentials are also used for re-authentication when the
/// session expires mid-call.
#[derive(Debug, Clone)]
pub struct OdooConfig {
    /// Server base URL, without a trailing slash.
    pub base_url: String,
    pub db: String,
    pub login: String,
    pub password: String,
    /// Per-request timeout for regular calls.
    pub timeout: Duration,
    /// Longer timeout for binary payload uploads.
    pub attachment_timeout: Duration,
}

impl OdooConfig {
    pub fn new(
        base_url: impl Into<String>,
        db: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            db: db.into(),
            login: login.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
            attachment_timeout: ATTACHMENT_TIMEOUT,
        }
    }

    pub fn authenticate_url(&self) -> String {
        format!("{}/web/session/authenticate", self.base_url)
    }

    pub fn call_kw_url(&self) -> String {
        format!("{}/web/dataset/call_kw", self.base_url)
    }
}

/// Bounded re-authentication policy for expired sessions.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Re-authentication attempts allowed per call.
    pub max_reauth: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_reauth: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = OdooConfig::new("https://erp.example.com/", "prod", "jo", "pw");
        assert_eq!(config.base_url, "https://erp.example.com");
        assert_eq!(
            config.authenticate_url(),
            "https://erp.example.com/web/session/authenticate"
        );
        assert_eq!(
            config.call_kw_url(),
            "https://erp.example.com/web/dataset/call_kw"
        );
    }

    #[test]
    fn default_timeouts() {
        let config = OdooConfig::new("http://localhost:8069", "dev", "jo", "pw");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.attachment_timeout, Duration::from_secs(120));
    }
}
