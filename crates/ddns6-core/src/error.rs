//! Error types for ddns6
//!
//! One enum covers the whole pipeline. The first three variants are the
//! pass-level failure taxonomy ([`Error::Discovery`], [`Error::Lookup`],
//! [`Error::Mutation`]); the rest describe what went wrong inside a provider
//! call or while loading configuration.
//!
//! Every pass-level failure is recoverable: the scheduler logs it and the
//! next tick tries again.

use std::fmt;
use thiserror::Error;

/// Result type alias for ddns6 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which provider mutation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Create => f.write_str("creation"),
            Mutation::Update => f.write_str("update"),
        }
    }
}

/// Core error type for ddns6
#[derive(Error, Debug)]
pub enum Error {
    /// No qualifying global IPv6 address was found on the interface
    #[error("address discovery failed: {0}")]
    Discovery(String),

    /// Querying the provider for the existing record failed
    #[error("record lookup failed: {0}")]
    Lookup(String),

    /// Creating or updating the record failed
    #[error("record {operation} failed: {message}")]
    Mutation {
        /// Which mutation was attempted
        operation: Mutation,
        /// Underlying error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors (connect, timeout, unreadable body)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Domain or record not found on the provider side
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an address discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Wrap a provider error raised while looking up the record
    pub fn lookup(err: impl fmt::Display) -> Self {
        Self::Lookup(err.to_string())
    }

    /// Wrap a provider error raised while creating or updating the record
    pub fn mutation(operation: Mutation, err: impl fmt::Display) -> Self {
        Self::Mutation {
            operation,
            message: err.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
