//! # Client Error Types
//!
//! Errors for configuration loading and price-service plumbing.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Wire format         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  DeserializationFailed  │ │
//! │  │  InvalidUrl     │  │  UnexpectedStatus│ │  InvalidPrice           │ │
//! │  │  ConfigLoad     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Transport and wire-format errors never leave RemotePriceSource: they   │
//! │  are logged and collapsed into PriceLookup::Unavailable.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid pricing configuration.
    #[error("Invalid pricing configuration: {0}")]
    InvalidConfig(String),

    /// Invalid price service URL.
    #[error("Invalid price service URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The transport could not complete the request.
    #[error("Price service request failed: {0}")]
    Transport(String),

    /// The price service answered with something other than 200.
    #[error("Price service returned status {0}")]
    UnexpectedStatus(u16),

    // =========================================================================
    // Wire Format Errors
    // =========================================================================
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// A price in the response body is not a decimal amount.
    #[error("Invalid price for {sku}: {reason}")]
    InvalidPrice { sku: String, reason: String },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            ClientError::DeserializationFailed(err.to_string())
        } else {
            ClientError::SerializationFailed(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}
