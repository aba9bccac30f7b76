use std::sync::Arc;

use quarry_search::SearchBackend;
use serde_json::Value;
use tracing::debug;

use crate::column::{ColumnHandle, ColumnType, TableSource};
use crate::config::ScrollConfig;
use crate::error::CursorError;
use crate::projection::FieldProjection;
use crate::resolver::IndexResolver;
use crate::row::Row;
use crate::scroll::ScrollFetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Created, not yet advanced. No row is readable.
    NotStarted,
    /// Positioned on a row.
    Active,
    /// Past the last row or closed. Only advancing is allowed, and it keeps
    /// returning `false`.
    Exhausted,
}

/// Row-at-a-time read surface handed to the host engine.
///
/// Callers advance, read the fields they need, then advance again. Field
/// indices are column positions in `[0, column_count)`.
pub trait RecordCursor {
    fn column_type(&self, field: usize) -> Result<ColumnType, CursorError>;

    /// Move to the next row. `Ok(false)` once there are no more rows.
    fn advance_next_position(&mut self) -> Result<bool, CursorError>;

    fn get_boolean(&self, field: usize) -> Result<bool, CursorError>;

    fn get_long(&self, field: usize) -> Result<i64, CursorError>;

    fn get_double(&self, field: usize) -> Result<f64, CursorError>;

    fn get_text(&self, field: usize) -> Result<&str, CursorError>;

    /// Structured values are not exposed by this cursor.
    fn get_object(&self, field: usize) -> Option<Value>;

    fn is_null(&self, field: usize) -> Result<bool, CursorError>;

    fn total_bytes(&self) -> u64;

    fn completed_bytes(&self) -> u64;

    fn read_time_nanos(&self) -> u64;

    fn close(&mut self);
}

/// A [`RecordCursor`] over every document of a logical type in a search
/// cluster.
///
/// Construction resolves the type's indices, fixes the column projection and
/// runs the initial scroll search; later pages are pulled while advancing.
/// Values are kept as text and only parsed, and type-checked, when read.
pub struct SearchRecordCursor<B: SearchBackend + ?Sized> {
    columns: Vec<ColumnHandle>,
    projection: FieldProjection,
    indices: Vec<String>,
    hits: ScrollFetcher<B>,
    row: Option<Row>,
    state: CursorState,
    total_bytes: u64,
}

impl<B: SearchBackend + ?Sized> SearchRecordCursor<B> {
    pub fn new(
        backend: Arc<B>,
        table: &TableSource,
        columns: Vec<ColumnHandle>,
        config: &ScrollConfig,
    ) -> Result<Self, CursorError> {
        debug!(
            cluster = %table.cluster,
            host = %table.host,
            port = table.port,
            index = %table.index,
            doc_type = %table.doc_type,
            "opening search cursor"
        );

        let indices = IndexResolver::resolve(&*backend, &table.doc_type)?;
        let projection = FieldProjection::build(&columns, config.path_collision)?;
        let hits = ScrollFetcher::open(
            backend,
            &indices,
            &table.doc_type,
            projection.paths(),
            config,
        )?;

        Ok(Self {
            columns,
            projection,
            indices,
            hits,
            row: None,
            state: CursorState::NotStarted,
            total_bytes: 0,
        })
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnHandle] {
        &self.columns
    }

    /// The physical indices this cursor reads.
    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    fn check_field(&self, field: usize) -> Result<(), CursorError> {
        if field < self.columns.len() {
            Ok(())
        } else {
            Err(CursorError::InvalidFieldIndex {
                field,
                width: self.columns.len(),
            })
        }
    }

    fn current_row(&self) -> Result<&Row, CursorError> {
        match (self.state, &self.row) {
            (CursorState::Active, Some(row)) => Ok(row),
            (CursorState::NotStarted, _) => {
                Err(CursorError::State("cursor has not been advanced yet"))
            }
            _ => Err(CursorError::State("cursor is exhausted")),
        }
    }

    /// Text of `field` in the current row, after the bounds, type and state
    /// checks every typed accessor shares.
    fn typed_value(&self, field: usize, expected: ColumnType) -> Result<&str, CursorError> {
        let actual = self.column_type(field)?;
        if actual != expected {
            return Err(CursorError::TypeMismatch {
                field,
                expected,
                actual,
            });
        }
        self.current_row()?
            .get(field)
            .ok_or(CursorError::MissingValue { field })
    }

    fn exhaust(&mut self) {
        self.row = None;
        self.state = CursorState::Exhausted;
        self.hits.close();
    }
}

impl<B: SearchBackend + ?Sized> RecordCursor for SearchRecordCursor<B> {
    fn column_type(&self, field: usize) -> Result<ColumnType, CursorError> {
        self.check_field(field)?;
        Ok(self.columns[field].column_type)
    }

    fn advance_next_position(&mut self) -> Result<bool, CursorError> {
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }
        match self.hits.next() {
            None => {
                self.exhaust();
                Ok(false)
            }
            Some(Err(e)) => {
                self.exhaust();
                Err(e)
            }
            Some(Ok(hit)) => {
                let row = Row::from_hit(hit, &self.projection);
                // Coarse size proxy: one unit per column, not a byte length.
                self.total_bytes += row.width() as u64;
                self.row = Some(row);
                self.state = CursorState::Active;
                Ok(true)
            }
        }
    }

    fn get_boolean(&self, field: usize) -> Result<bool, CursorError> {
        let value = self.typed_value(field, ColumnType::Boolean)?;
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(parse_error(field, value, ColumnType::Boolean))
        }
    }

    fn get_long(&self, field: usize) -> Result<i64, CursorError> {
        let value = self.typed_value(field, ColumnType::Bigint)?;
        value
            .parse()
            .map_err(|_| parse_error(field, value, ColumnType::Bigint))
    }

    fn get_double(&self, field: usize) -> Result<f64, CursorError> {
        let value = self.typed_value(field, ColumnType::Double)?;
        value
            .parse()
            .map_err(|_| parse_error(field, value, ColumnType::Double))
    }

    fn get_text(&self, field: usize) -> Result<&str, CursorError> {
        self.typed_value(field, ColumnType::Varchar)
    }

    fn get_object(&self, _field: usize) -> Option<Value> {
        None
    }

    fn is_null(&self, field: usize) -> Result<bool, CursorError> {
        self.check_field(field)?;
        Ok(self.current_row()?.is_null(field))
    }

    fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    fn completed_bytes(&self) -> u64 {
        self.total_bytes
    }

    fn read_time_nanos(&self) -> u64 {
        0
    }

    fn close(&mut self) {
        self.exhaust();
    }
}

fn parse_error(field: usize, value: &str, expected: ColumnType) -> CursorError {
    CursorError::Parse {
        field,
        value: value.to_string(),
        expected,
    }
}
