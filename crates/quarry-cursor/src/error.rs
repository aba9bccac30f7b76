use quarry_search::ClientError;

use crate::column::ColumnType;

#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("invalid field index {field}: row has {width} columns")]
    InvalidFieldIndex { field: usize, width: usize },

    #[error("expected field {field} to be type {expected} but is {actual}")]
    TypeMismatch {
        field: usize,
        expected: ColumnType,
        actual: ColumnType,
    },

    #[error("cannot parse {value:?} in field {field} as {expected}")]
    Parse {
        field: usize,
        value: String,
        expected: ColumnType,
    },

    #[error("field {field} has no value in the current row")]
    MissingValue { field: usize },

    #[error("{0}")]
    State(&'static str),

    #[error("columns {first:?} and {second:?} both read source path {path:?}")]
    DuplicateFieldPath {
        path: String,
        first: String,
        second: String,
    },

    #[error("backend error: {0}")]
    Backend(#[from] ClientError),
}
