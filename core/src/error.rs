//! Error types for the Smaregi API client.
//!
//! # Design
//! Every failure is returned to the caller tagged with the operation that
//! produced it (`product_ref`, `stock_upd`, `stock webhook`, ...). Nothing is
//! retried or logged here. Field-level conversion failures get their own
//! `ParseError` so callers can see which wire value was rejected.

use thiserror::Error;

/// Errors returned by `SmaregiClient` and the webhook parser.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not complete the round-trip.
    #[error("{operation}: transport error: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    /// The server answered with a status outside `200..300`.
    #[error("{operation}: HTTP {status}: {body}")]
    HttpStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be read or is not the expected JSON shape.
    #[error("{operation}: decode error: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: DecodeError,
    },

    /// A wire string in record `index` could not be converted to its typed form.
    #[error("{operation}: record {index}: {source}")]
    Parse {
        operation: &'static str,
        index: usize,
        #[source]
        source: ParseError,
    },

    /// The request payload could not be serialized to JSON.
    #[error("{operation}: encode error: {source}")]
    Encode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Name of the operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            ApiError::Transport { operation, .. }
            | ApiError::HttpStatus { operation, .. }
            | ApiError::Decode { operation, .. }
            | ApiError::Parse { operation, .. }
            | ApiError::Encode { operation, .. } => operation,
        }
    }
}

/// Failure reported by a `Transport` implementation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    body_read: bool,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            body_read: false,
            source: None,
        }
    }

    /// The request could not be sent or no response arrived.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            body_read: false,
            source: Some(source.into()),
        }
    }

    /// A response arrived but its body could not be read to the end.
    pub fn body_read(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            message: "failed to read response body".to_string(),
            body_read: true,
            source: Some(source.into()),
        }
    }

    pub fn is_body_read(&self) -> bool {
        self.body_read
    }
}

/// Why a response body was rejected before any field was converted.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{0}")]
    Body(#[source] TransportError),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single wire string that failed to convert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}`: {kind} (raw value {value:?})")]
pub struct ParseError {
    pub field: &'static str,
    pub value: String,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("required value is empty")]
    Empty,

    #[error("invalid integer: {0}")]
    Integer(#[from] std::num::ParseIntError),

    #[error("invalid date-time: {0}")]
    DateTime(#[from] chrono::ParseError),

    #[error("date-time out of range")]
    OutOfRange,
}

/// Errors raised while loading `ClientConfig` from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_names_field_and_value() {
        let err = ParseError {
            field: "storeId",
            value: String::new(),
            kind: ParseErrorKind::Empty,
        };
        assert_eq!(
            err.to_string(),
            "field `storeId`: required value is empty (raw value \"\")"
        );
    }

    #[test]
    fn api_error_carries_operation() {
        let err = ApiError::HttpStatus {
            operation: "stock_upd",
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.operation(), "stock_upd");
        assert_eq!(err.to_string(), "stock_upd: HTTP 500: boom");
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::with_source("connect failed", io);
        assert!(!err.is_body_read());
        assert!(std::error::Error::source(&err).is_some());
    }
}
