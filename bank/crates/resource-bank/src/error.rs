use thiserror::Error;

/// Outcome of a rejected bank operation.
///
/// The first three variants are business conditions the caller is expected
/// to branch on. A rejected operation never mutates, notifies or saves.
#[derive(Debug, Error)]
pub enum BankError {
    /// The requested amount was below zero.
    #[error("amount must not be negative")]
    NegativeAmount,

    /// The requested amount was exactly zero.
    #[error("amount must not be zero")]
    ZeroAmount,

    /// The balance is smaller than the requested debit.
    #[error("insufficient amount")]
    InsufficientAmount,

    /// Applying the amount would leave the signed 64-bit range.
    #[error("balance overflow")]
    Overflow,

    /// The save handler failed to load or persist the snapshot.
    #[error("persistence failure: {0}")]
    Save(#[from] SaveError),
}

impl BankError {
    /// True for the amount/balance conditions, false for overflow and
    /// persistence failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BankError::NegativeAmount | BankError::ZeroAmount | BankError::InsufficientAmount
        )
    }
}

/// Errors raised by save handlers and key/value stores.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt save data: {0}")]
    Corrupt(String),
}
