//! Business rule validation for ledger operations.
//!
//! These checks run before any store access so that a rejected request
//! never opens a unit of work.

use bank_shared::types::{MAX_PAGE_SIZE, PageRequest};

use super::error::LedgerError;

/// Validates that an amount in minor units is strictly positive.
///
/// # Errors
///
/// Returns `InvalidAmount` for zero or negative amounts.
pub fn validate_amount(amount_cents: i64) -> Result<(), LedgerError> {
    if amount_cents <= 0 {
        return Err(LedgerError::InvalidAmount(amount_cents));
    }
    Ok(())
}

/// Validates that a description fits in `max` characters.
///
/// # Errors
///
/// Returns `DescriptionTooLong` when the description is longer than `max`.
pub fn validate_description(description: &str, max: usize) -> Result<(), LedgerError> {
    let actual = description.chars().count();
    if actual > max {
        return Err(LedgerError::DescriptionTooLong { max, actual });
    }
    Ok(())
}

/// Validates a page request for list operations.
///
/// # Errors
///
/// Returns `InvalidPage` when the page size is out of range.
pub fn validate_page(page: &PageRequest) -> Result<(), LedgerError> {
    if !page.is_valid() {
        return Err(LedgerError::InvalidPage {
            page_size: page.page_size,
            max: MAX_PAGE_SIZE,
        });
    }
    Ok(())
}
