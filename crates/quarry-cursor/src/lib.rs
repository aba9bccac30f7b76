mod column;
mod config;
mod cursor;
mod error;
mod projection;
mod resolver;
mod row;
mod scroll;

pub use column::{ColumnHandle, ColumnType, TableSource};
pub use config::{PathCollision, ScrollConfig};
pub use cursor::{CursorState, RecordCursor, SearchRecordCursor};
pub use error::CursorError;
pub use projection::FieldProjection;
pub use resolver::{IndexResolver, filter_indices};
pub use row::Row;
pub use scroll::ScrollFetcher;
