//! # Error Types
//!
//! Domain-specific error types for bookshelf-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bookshelf-core errors (this file)                                     │
//! │  ├── CoreError        - Catalog and state machine errors               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bookshelf-checkout errors (separate crate)                            │
//! │  ├── PaymentError     - Payment collaborator failures                  │
//! │  └── CheckoutError    - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → Presentation      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations never fail: removing an unknown item is a no-op and a
//! quantity below one is an implicit removal. Errors only come from the
//! catalog and from illegal checkout transitions.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Catalog item cannot be found.
    #[error("Catalog item not found: {0}")]
    ItemNotFound(String),

    /// Catalog already contains an item with this id.
    #[error("Catalog item '{0}' already exists")]
    DuplicateItem(String),

    /// A checkout transition was requested from a state that doesn't allow it.
    ///
    /// ## When This Occurs
    /// - Starting a second checkout while one is `processing`
    /// - Completing a checkout that was never started
    #[error("Cannot {action} while checkout is {state}")]
    InvalidTransition { action: String, state: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., lower-case currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
