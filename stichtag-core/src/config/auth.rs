//! Access token configuration.

/// Access token configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key bytes for HMAC-signing access tokens.
    pub token_secret: Box<[u8]>,
    /// Token lifetime in minutes.
    pub token_ttl_minutes: i64,
}

impl AuthConfig {
    /// Create a new AuthConfig.
    pub fn new(token_secret: impl Into<Box<[u8]>>, token_ttl_minutes: i64) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_ttl_minutes,
        }
    }

    /// Get the secret key bytes for HMAC signing.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.token_secret
    }
}
