//! Error types for fastods

use thiserror::Error;

/// Result type alias for fastods operations
pub type Result<T> = std::result::Result<T, OdsError>;

/// Main error type for all ODS writing operations
#[derive(Error, Debug)]
pub enum OdsError {
    /// Row or column index outside the sheet limits
    #[error("Invalid {what} index {index} (limit: {max})")]
    InvalidIndex {
        what: &'static str,
        index: u32,
        max: u32,
    },

    /// Row was already closed by a later row request
    #[error("Row {row} is closed (table cursor is at row {cursor})")]
    RowClosed { row: u32, cursor: u32 },

    /// Merge region overlaps a covered or spanned cell
    #[error("Can't merge over cell ({row}, {col}): it already belongs to a merged region")]
    OverlappingMerge { row: u32, col: u32 },

    /// New style registered after the styles were frozen
    #[error("Styles are frozen, can't register new style '{0}'")]
    StylesFrozen(String),

    /// Update of a style that was never registered
    #[error("Style '{0}' not found")]
    StyleNotFound(String),

    /// Malformed style name
    #[error("Invalid style name: '{0}'")]
    InvalidStyleName(String),

    /// Malformed or duplicate table name
    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),

    /// Table id does not exist
    #[error("Table #{0} not found")]
    TableNotFound(usize),

    /// Table was already closed
    #[error("Table '{0}' is closed")]
    TableClosed(String),

    /// Operation not allowed in the table's current state
    #[error("Operation not allowed on table '{table}' in state {state}")]
    TableStateError { table: String, state: String },

    /// Value can't be coerced to the requested cell type
    #[error("Can't convert '{value}' to {target}")]
    Conversion { value: String, target: &'static str },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// s-zip error wrapper
    #[error("ZIP error: {0}")]
    Zip(#[from] s_zip::SZipError),

    /// An earlier flush failed, the output is invalid
    #[error("Flush aborted by an earlier error")]
    FlushAborted,

    /// The background flush thread panicked
    #[error("Flush thread panicked")]
    FlushThreadPanicked,

    /// The flush queue was closed before the document was finalized
    #[error("Document was not finalized")]
    Unfinished,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl OdsError {
    /// Programmer mistakes: bad indexes, overlapping merges, styles after freeze...
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            OdsError::InvalidIndex { .. }
                | OdsError::RowClosed { .. }
                | OdsError::OverlappingMerge { .. }
                | OdsError::StylesFrozen(_)
                | OdsError::StyleNotFound(_)
                | OdsError::InvalidStyleName(_)
                | OdsError::InvalidTableName(_)
                | OdsError::TableNotFound(_)
                | OdsError::TableClosed(_)
                | OdsError::TableStateError { .. }
        )
    }

    /// Failures of the underlying output. The file must be discarded.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            OdsError::Io(_)
                | OdsError::Zip(_)
                | OdsError::FlushAborted
                | OdsError::FlushThreadPanicked
                | OdsError::Unfinished
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = OdsError::OverlappingMerge { row: 1, col: 2 };
        assert!(err.is_usage_error());
        assert!(!err.is_io_error());

        let err = OdsError::from(std::io::Error::other("disk full"));
        assert!(err.is_io_error());
        assert!(!err.is_usage_error());

        let err = OdsError::Conversion {
            value: "abc".to_string(),
            target: "float",
        };
        assert!(!err.is_usage_error());
        assert!(!err.is_io_error());
        assert_eq!(err.to_string(), "Can't convert 'abc' to float");
    }
}
