//! Unified error handling for controller operations.
//!
//! Every controller operation returns `Result<_, AppError>`. The front end
//! formats a failed operation into a transient notice exactly once; no error
//! is retried or reported anywhere else. Precondition failures (no user
//! selected, invalid quantity, missing form fields) share the same surface
//! as network and backend errors.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Application-level error type for the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed (transport, schema, or server-reported error).
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Writing a downloaded file failed.
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation that needs an active user ran without one.
    #[error("You must select a user first")]
    NoUserSelected,

    /// Add-to-cart quantity outside `[1, stock]`.
    #[error("Invalid quantity")]
    InvalidQuantity {
        /// Requested quantity.
        quantity: u32,
        /// Stock bound at validation time.
        stock: u32,
    },

    /// An admin create form was submitted with missing fields.
    #[error("Please fill in all required fields")]
    MissingFields,

    /// A referenced product is not in the loaded catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// A status selector value outside the known lifecycle.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// A malformed email address in the user-creation form.
    #[error("{0}")]
    Email(#[from] shoplane_core::EmailError),
}

impl AppError {
    /// Message shown on the notice board, with the uniform `Error:` prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_messages() {
        assert_eq!(
            AppError::NoUserSelected.user_message(),
            "Error: You must select a user first"
        );
        assert_eq!(
            AppError::InvalidQuantity {
                quantity: 7,
                stock: 3
            }
            .user_message(),
            "Error: Invalid quantity"
        );
    }

    #[test]
    fn test_backend_message_passes_through() {
        let err = AppError::Api(ApiError::Backend {
            status: reqwest::StatusCode::NOT_FOUND,
            message: "Order not found".to_owned(),
        });
        assert_eq!(err.user_message(), "Error: Order not found");
    }
}
