use quarry_search::SearchHit;
use serde_json::Value;

use crate::projection::FieldProjection;

/// One materialized row: a text value per column, `None` where the hit did
/// not carry the column's field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<Option<String>>,
}

impl Row {
    pub fn absent(width: usize) -> Self {
        Self {
            values: vec![None; width],
        }
    }

    /// Fold a hit into a row. Only the first element of each field's value
    /// list is kept; fields outside the projection are ignored.
    pub fn from_hit(hit: SearchHit, projection: &FieldProjection) -> Self {
        let mut row = Self::absent(projection.width());
        for (path, values) in hit.fields {
            let Some(index) = projection.index_of(&path) else {
                continue;
            };
            row.values[index] = values.into_iter().next().and_then(render);
        }
        row
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, field: usize) -> Option<&str> {
        self.values.get(field)?.as_deref()
    }

    pub fn is_null(&self, field: usize) -> bool {
        self.get(field).is_none_or(str::is_empty)
    }
}

fn render(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}
