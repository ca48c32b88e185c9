//! Amount validation.

use crate::error::BankError;

/// Classify a requested amount. Zero and negative amounts are rejected;
/// everything else passes.
pub fn validate_amount(amount: i64) -> Result<(), BankError> {
    match amount {
        0 => Err(BankError::ZeroAmount),
        a if a < 0 => Err(BankError::NegativeAmount),
        _ => Ok(()),
    }
}

/// Validate `amount` and check it against `balance`.
///
/// `InsufficientAmount` is only reported once the amount itself is valid.
pub fn check_spend(balance: i64, amount: i64) -> Result<(), BankError> {
    validate_amount(amount)?;
    if balance < amount {
        return Err(BankError::InsufficientAmount);
    }
    Ok(())
}
