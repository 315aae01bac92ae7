//! Error types for predicate derivation and page assembly.
//!
//! Every failure is a local validation failure: nothing here performs I/O, so an error never
//! leaves partial state behind and is never retried internally.

use thiserror::Error;

use crate::cursor::CursorError;

/// Errors surfaced synchronously by [`crate::derive`], [`crate::assemble`] and
/// [`crate::Pagination`].
#[derive(Debug, Error)]
pub enum PagingError {
    /// Malformed slice arguments (neither/both of `first`/`last`, non-positive or oversized
    /// page size, mixed forward and backward arguments).
    #[error("Invalid pagination request: {0}")]
    InvalidRequest(String),

    /// A sort/direction combination outside the supported set.
    #[error("Invalid pagination state: {0}")]
    InvalidState(String),

    /// The caller handed back rows that could not have come from the derived predicate.
    #[error("Pagination contract violated: {0}")]
    ContractViolation(String),

    /// A cursor could not be decoded by the configured codec.
    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    /// The row a cursor points at no longer exists in the source.
    #[error("Cursor not found: {0}")]
    CursorNotFound(String),
}

/// Result type for pagination operations.
pub type PagingResult<T> = Result<T, PagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_errors_convert_with_question_mark() {
        fn decode() -> PagingResult<()> {
            Err(CursorError::Empty)?;
            Ok(())
        }

        let err = decode().unwrap_err();
        assert!(matches!(err, PagingError::Cursor(CursorError::Empty)));
        assert!(err.to_string().starts_with("Cursor error"));
    }

    #[test]
    fn messages_carry_their_detail() {
        let err = PagingError::ContractViolation("received 5 rows, expected at most 4".into());
        assert!(err.to_string().contains("at most 4"));
    }
}
