use std::collections::HashMap;

use tracing::warn;

use crate::column::ColumnHandle;
use crate::config::PathCollision;
use crate::error::CursorError;

/// Source path to row position, fixed for the lifetime of a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProjection {
    positions: HashMap<String, usize>,
    paths: Vec<String>,
    width: usize,
}

impl FieldProjection {
    /// Build the projection for `columns`, in column order.
    ///
    /// `paths()` lists each distinct source path once, in first-seen order;
    /// that is the field list sent to the backend. When two columns share a
    /// path, `on_collision` decides between keeping the later column and
    /// refusing the column list.
    pub fn build(
        columns: &[ColumnHandle],
        on_collision: PathCollision,
    ) -> Result<Self, CursorError> {
        let mut positions = HashMap::with_capacity(columns.len());
        let mut paths = Vec::with_capacity(columns.len());

        for (index, column) in columns.iter().enumerate() {
            let Some(previous) = positions.insert(column.path.clone(), index) else {
                paths.push(column.path.clone());
                continue;
            };
            let shadowed = &columns[previous].name;
            match on_collision {
                PathCollision::Reject => {
                    return Err(CursorError::DuplicateFieldPath {
                        path: column.path.clone(),
                        first: shadowed.clone(),
                        second: column.name.clone(),
                    });
                }
                PathCollision::LastWins => {
                    warn!(
                        path = %column.path,
                        shadowed = %shadowed,
                        column = %column.name,
                        "columns share a source path; the earlier column will read null"
                    );
                }
            }
        }

        Ok(Self {
            positions,
            paths,
            width: columns.len(),
        })
    }

    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.positions.get(path).copied()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Row width: the column count, including shadowed columns.
    pub fn width(&self) -> usize {
        self.width
    }
}
