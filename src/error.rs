//! Error types for the Emporia gateway.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type.
///
/// Authentication failures ([`Error::RefreshRejected`],
/// [`Error::AuthenticationFailed`]) are distinct from a terminal
/// [`Error::Unauthorized`] on an API call, so callers can decide between
/// prompting for new credentials and simply retrying later.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No credentials are held and none could be obtained.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A required credential was not supplied.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The identity provider rejected the refresh token (expired/revoked).
    #[error("refresh token rejected: {0}")]
    RefreshRejected(String),

    /// The password key-exchange flow failed (bad credentials, malformed
    /// challenge, or the provider rejected the claim).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A request was still rejected as unauthorized after the single
    /// transparent re-authentication retry. Terminal for that request.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Non-2xx API response other than 401.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (DNS, reset, TLS).
    #[error("network error: {0}")]
    Network(reqwest::Error),

    /// Malformed response body or unparsable payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// Event stream transport failure.
    #[error("stream error: {0}")]
    Stream(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures of the credential exchange itself.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated
                | Self::MissingCredential(_)
                | Self::RefreshRejected(_)
                | Self::AuthenticationFailed(_)
        )
    }

    /// Map a reqwest transport error, keeping timeouts distinguishable.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(e)
        }
    }
}
