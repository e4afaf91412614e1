//! Command implementations, one module per resource.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

use brimline_storefront::Storefront;
use brimline_storefront::checkout::CheckoutError;
use brimline_storefront::routes::{Access, Requirement, Route};
use brimline_storefront::sync::{PendingSync, SyncOutcome};
use thiserror::Error;

/// Errors reported to the operator.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Opening the storefront failed.
    #[error(transparent)]
    Storefront(#[from] brimline_storefront::Error),

    /// The session may not see this page.
    #[error("{route} requires {requirement}; log in at {redirect}")]
    Denied {
        route: Route,
        requirement: &'static str,
        redirect: &'static str,
    },

    /// Nothing matched the given identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store reported a failure; details were logged.
    #[error("{0}")]
    Failed(String),

    /// Argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// Refuse to continue unless the session may render `route`.
pub fn require(storefront: &Storefront, route: Route) -> Result<(), CommandError> {
    match storefront.guard(&route) {
        Access::Render => Ok(()),
        Access::Redirect(redirect) => {
            let requirement = match route.requirement() {
                Requirement::Admin => "an admin login",
                _ => "a login",
            };
            tracing::warn!(route = %route, "Access denied");
            Err(CommandError::Denied {
                route,
                requirement,
                redirect,
            })
        }
    }
}

/// Wait for a background cart sync so the process does not exit under it.
pub async fn settle(pending: PendingSync) {
    match pending.outcome().await {
        SyncOutcome::Failed(reason) => {
            tracing::warn!(reason = %reason, "Cart kept locally; backend sync failed");
        }
        SyncOutcome::Synced | SyncOutcome::Skipped | SyncOutcome::LocalOnly => {}
    }
}
