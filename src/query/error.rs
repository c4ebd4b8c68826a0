//! Error types for the query layer.

use thiserror::Error;

use crate::mapping::MappingError;

/// Errors that can occur while querying the delivery API.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, timeouts)
    #[error("network error requesting {url}: {source}")]
    Http {
        /// The request URL
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with an error status
    #[error("delivery API returned HTTP {status} for {url}: {message}\n  Suggestion: {suggestion}")]
    Api {
        /// The request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Message from the error body, or the status reason
        message: String,
        /// API error code, when the body carried one
        error_code: Option<i64>,
        /// Finer-grained code qualifying `error_code`
        specific_code: Option<i64>,
        /// Request id to quote when contacting support
        request_id: Option<String>,
        /// How to fix the issue
        suggestion: String,
    },

    /// The response body is not the JSON the endpoint promises
    #[error("invalid JSON in response from {url}: {reason}")]
    Deserialize {
        /// The request URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// The base URL or a path segment does not form a valid URL
    #[error("invalid URL '{url}': {reason}\n  Suggestion: Check the base URL and project id")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The response could not be mapped into items
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl DeliveryError {
    /// Creates an `Api` error with a suggestion derived from the status.
    #[must_use]
    pub fn api(
        url: &str,
        status: u16,
        message: String,
        error_code: Option<i64>,
        specific_code: Option<i64>,
        request_id: Option<String>,
    ) -> Self {
        let suggestion = match status {
            400 => "Check the query parameters and filters",
            401 | 403 => "Check the project id; secured and preview access is not supported",
            404 => "Check the codename and project id",
            429 => "Too many requests; try again later",
            500..=599 => "The delivery API is having problems; try again later",
            _ => "Inspect the request id with the API provider",
        };
        Self::Api {
            url: url.to_string(),
            status,
            message,
            error_code,
            specific_code,
            request_id,
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates a `Deserialize` error.
    #[must_use]
    pub fn deserialize(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Deserialize {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
