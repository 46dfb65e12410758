use tracing::debug;

/// The result type returned by column operations.
pub type ColumnResult<T> = Result<T, ColumnError>;

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
/// An error that can occur when an operation is applied to a column.
///
/// Both kinds are contract errors, the operation has not changed the column
/// when either is returned.
pub enum ColumnError {
    #[error("size of {what} doesn't match size of column: expected {expected}, got {actual}")]
    /// The length of an index structure disagrees with the column size.
    SizeMismatch {
        /// The structure that was checked, e.g. `permutation`.
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("method {operation} is not supported for {column}")]
    /// The column variant has no value representation for the operation.
    Unsupported {
        operation: &'static str,
        /// The name of the column variant.
        column: String,
    },
}

impl ColumnError {
    pub(crate) fn size_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        debug!(what, expected, actual, "Column size mismatch");
        Self::SizeMismatch {
            what,
            expected,
            actual,
        }
    }

    pub(crate) fn unsupported(operation: &'static str, column: impl Into<String>) -> Self {
        let column = column.into();
        debug!(operation, column = %column, "Unsupported column operation");
        Self::Unsupported { operation, column }
    }

    /// Returns `true` if the error is a [ColumnError::SizeMismatch].
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self, Self::SizeMismatch { .. })
    }

    /// Returns `true` if the error is a [ColumnError::Unsupported].
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
