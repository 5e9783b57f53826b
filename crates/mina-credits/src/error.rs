use thiserror::Error;

/// Errors from the credit ledger.
///
/// A failed deduction is NOT an error: `deduct` returns `Ok(false)` when
/// the balance is insufficient. Everything here is the transient kind.
#[derive(Debug, Error)]
pub enum CreditError {
    /// A SQLite operation failed.
    #[error("credit store error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, CreditError>;
