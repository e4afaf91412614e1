//! Crate-level error type and Sentry user context.
//!
//! Store operations report failures through return values and tracing
//! events. [`Error`] is for the fallible setup paths: loading configuration,
//! opening persisted state and building the HTTP transport.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Errors surfaced by the storefront library.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persisted state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout did not produce an order.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Set the Sentry user context from a user ID.
///
/// Called after a successful login so errors are associated with the user.
/// A no-op when no Sentry client is bound.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_checkout_error() {
        let err: Error = CheckoutError::EmptyCart.into();
        assert_eq!(err.to_string(), "Checkout error: Cart is empty");
    }

    #[test]
    fn test_wraps_config_error() {
        let err: Error =
            ConfigError::InvalidEnvVar("BRIMLINE_API_URL".into(), "relative URL".into()).into();
        assert!(err.to_string().starts_with("Configuration error: Invalid environment variable BRIMLINE_API_URL"));
    }
}
