use thiserror::Error;

/// Failure of a single client operation.
///
/// The variants keep connectivity, HTTP status and decode failures apart so
/// layers above can tell them apart; no retry happens at this level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unsupported content type {0}")]
    UnsupportedContentType(String),
}

pub(crate) fn map_transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::Timeout;
    }
    if err.is_decode() {
        return ClientError::Decode(err.to_string());
    }
    ClientError::Network(err.to_string())
}
