use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// The error type for bedsign operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    body: Option<String>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials are missing, invalid or malformed
    CredentialInvalid,

    /// Configuration error (missing region, empty model id, invalid endpoint)
    ConfigInvalid,

    /// Request cannot be assembled (invalid uri, invalid header value)
    RequestInvalid,

    /// Cryptographic primitive failed while signing
    SigningFailed,

    /// Network failure or non-2xx response from the service
    Transport,

    /// Service was reachable but returned a body we can't understand
    ResponseInvalid,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status returned by the service, if the error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Raw response body returned by the service, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Check if this is a configuration error, credentials included.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ConfigInvalid | ErrorKind::CredentialInvalid
        )
    }

    /// Check if this is a transport error
    pub fn is_transport_error(&self) -> bool {
        self.kind == ErrorKind::Transport
    }

    /// Check if this is a response parse error
    pub fn is_parse_error(&self) -> bool {
        self.kind == ErrorKind::ResponseInvalid
    }
}

// Convenience constructors
impl Error {
    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a signing failed error
    pub fn signing_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SigningFailed, message)
    }

    /// Create a transport error that never reached a response
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a transport error from a non-success response
    pub fn unexpected_status(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            kind: ErrorKind::Transport,
            message: format!("service responded with {status}: {body}"),
            status: Some(status),
            body: Some(body),
            source: None,
        }
    }

    /// Create a response invalid error
    pub fn response_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseInvalid, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CredentialInvalid => write!(f, "invalid credentials"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::SigningFailed => write!(f, "signing failed"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::ResponseInvalid => write!(f, "invalid response"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::response_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_keeps_status_and_body() {
        let err = Error::unexpected_status(StatusCode::FORBIDDEN, "{\"message\":\"denied\"}");

        assert!(err.is_transport_error());
        assert!(!err.is_parse_error());
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.body(), Some("{\"message\":\"denied\"}"));
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn test_kind_predicates() {
        assert!(Error::credential_invalid("no key").is_config_error());
        assert!(Error::config_invalid("no region").is_config_error());
        assert!(!Error::transport("connect refused").is_config_error());
        assert!(Error::response_invalid("missing results").is_parse_error());
        assert_eq!(Error::transport("reset").status(), None);
    }

    #[test]
    fn test_serde_json_error_is_parse_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .expect_err("must be invalid json")
            .into();
        assert_eq!(err.kind(), ErrorKind::ResponseInvalid);
    }
}
