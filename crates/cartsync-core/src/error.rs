//! Error types for the cart synchronization core.

use thiserror::Error;

use crate::gateway::UserError;

/// A shared error type for the cart core and its adapters.
///
/// Gateway failures (`Transport`, `RemoteValidation`, `EmptyResult`) are
/// caught at the store boundary and turned into a status message; they never
/// corrupt committed cart state.
#[derive(Error, Debug, Clone)]
pub enum CartError {
    /// Network or HTTP level failure talking to the commerce backend.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Structured user-facing errors returned by the commerce backend
    #[error("Remote validation failed: {}", join_messages(.0))]
    RemoteValidation(Vec<UserError>),

    /// The call succeeded but no usable cart came back.
    #[error("Empty result from {operation}")]
    EmptyResult { operation: String },

    /// Malformed on-device record. Recovered silently as "no prior cart".
    #[error("Persisted cart could not be decoded: {0}")]
    PersistenceDecode(String),

    /// Storage backend error (unavailable, quota, IO)
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Caller supplied an input the core refuses to act on.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_messages(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CartError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn empty_result(operation: impl Into<String>) -> Self {
        Self::EmptyResult {
            operation: operation.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// True for failures that originate at the remote commerce service.
    pub fn is_gateway_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::RemoteValidation(_) | Self::EmptyResult { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_remote_validation(&self) -> bool {
        matches!(self, Self::RemoteValidation(_))
    }

    /// Human-readable text surfaced to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => {
                "We couldn't reach the store. Please check your connection and try again."
                    .to_string()
            }
            Self::RemoteValidation(errors) if !errors.is_empty() => join_messages(errors),
            Self::RemoteValidation(_) => "The store rejected this change.".to_string(),
            Self::EmptyResult { .. } => {
                "The store returned an empty cart. Please try again.".to_string()
            }
            Self::NotFound { .. } => "That item is no longer in your cart.".to_string(),
            Self::InvalidInput(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        Self::PersistenceDecode(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for CartError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, CartError>`.
pub type Result<T> = std::result::Result<T, CartError>;
