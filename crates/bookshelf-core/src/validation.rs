//! # Validation Module
//!
//! Input validation for catalog records and checkout parameters.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (mobile UI)                                     │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Catalog / Currency parsing                                   │
//! │  └── THIS MODULE: rejects malformed records before they reach a cart   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Type invariants                                              │
//! │  └── Discount within 0-100%, CartLine quantity never below 1           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bookshelf_core::validation::{validate_currency_code, validate_item_id};
//!
//! validate_item_id("978-0156012195").unwrap();
//! validate_currency_code("EUR").unwrap();
//! assert!(validate_currency_code("eur").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{CatalogItem, Discount};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted catalog id.
pub const MAX_ID_LEN: usize = 64;

/// Longest accepted title / author.
pub const MAX_TEXT_LEN: usize = 200;

/// Longest accepted search query.
pub const MAX_QUERY_LEN: usize = 100;

/// Highest review rating.
pub const MAX_RATING: f32 = 5.0;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog item identifier.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 64 characters
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(())
}

/// Validates a free-text field such as a title or author name.
pub fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// Empty is fine: an empty query matches every item.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates an ISO 4217 currency code.
///
/// ## Rules
/// - Exactly three ASCII upper-case letters (`USD`, `EUR`, `MXN`)
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter upper-case ISO 4217 code".to_string(),
        });
    }

    Ok(())
}

/// Validates an ISBN-10 or ISBN-13.
///
/// Hyphens and spaces are ignored; the check digit is not verified. An
/// ISBN-10 may end in `X`.
pub fn validate_isbn(isbn: &str) -> ValidationResult<()> {
    let compact: Vec<char> = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();

    let valid = match compact.len() {
        13 => compact.iter().all(char::is_ascii_digit),
        10 => {
            compact[..9].iter().all(char::is_ascii_digit)
                && (compact[9].is_ascii_digit() || compact[9] == 'X')
        }
        _ => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "isbn".to_string(),
            reason: "must be 10 or 13 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount in basis points (0 to 10000).
///
/// Applied to the raw value when a [`Discount`] is deserialized, so imported
/// catalogs are rejected rather than silently clamped.
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps > Discount::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: Discount::MAX_BPS as i64,
        });
    }

    Ok(())
}

/// Validates a review rating (0 to 5).
pub fn validate_rating(rating: f32) -> ValidationResult<()> {
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0,
            max: MAX_RATING as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every field of a catalog item.
pub fn validate_catalog_item(item: &CatalogItem) -> ValidationResult<()> {
    validate_item_id(&item.id)?;
    validate_text("title", &item.title)?;
    validate_text("author", &item.author)?;
    validate_price_cents(item.price.cents())?;

    if let Some(isbn) = &item.isbn {
        validate_isbn(isbn)?;
    }

    if let Some(rating) = item.rating {
        validate_rating(rating)?;
    }

    for review in &item.reviews {
        validate_text("user", &review.user)?;
        validate_rating(review.rating)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
