use douban_meta_core::MetaError;
use thiserror::Error;

/// Errors produced by the catalog client.
///
/// Only [`ClientError::Cancelled`] escapes a resolution call. Transport
/// failures and non-2xx responses are logged by the fetcher and surface as
/// "no content".
#[derive(Debug, Error)]
pub enum ClientError {
    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A core parser failed to build.
    #[error("core error: {0}")]
    Core(#[from] MetaError),

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A request could not be completed.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(ClientError::Cancelled.to_string(), "operation cancelled");
        assert_eq!(
            ClientError::Config("timeout_ms must be positive".into()).to_string(),
            "invalid configuration: timeout_ms must be positive"
        );
    }

    #[test]
    fn core_errors_convert() {
        let err: ClientError = MetaError::EmptyInput.into();
        assert!(matches!(err, ClientError::Core(MetaError::EmptyInput)));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
