#![allow(dead_code)]

use std::sync::Arc;

use quarry_cursor::{ColumnHandle, ColumnType, ScrollConfig, SearchRecordCursor, TableSource};
use quarry_search::MemoryBackend;
use serde_json::json;

pub const DOC_TYPE: &str = "accounts";

pub fn table() -> TableSource {
    TableSource {
        cluster: "test".into(),
        host: "127.0.0.1".into(),
        port: 9200,
        index: DOC_TYPE.into(),
        doc_type: DOC_TYPE.into(),
    }
}

/// name: varchar, employees: bigint, revenue: double, active: boolean
pub fn columns() -> Vec<ColumnHandle> {
    vec![
        ColumnHandle::new("name", "name", ColumnType::Varchar),
        ColumnHandle::new("employees", "employees", ColumnType::Bigint),
        ColumnHandle::new("revenue", "revenue", ColumnType::Double),
        ColumnHandle::new("active", "active", ColumnType::Boolean),
    ]
}

/// Five accounts split over two indices, plus an unrelated index.
pub fn seeded_backend() -> Arc<MemoryBackend> {
    let backend = MemoryBackend::new();
    backend
        .insert_many(
            "accounts_2024",
            DOC_TYPE,
            vec![
                json!({ "name": "Acme Corp", "employees": 42, "revenue": 50000.5, "active": true }),
                json!({ "name": "Globex", "employees": 7, "revenue": 80000.0, "active": false }),
                json!({ "name": "Initech", "employees": 120, "revenue": 12000.25 }),
            ],
        )
        .unwrap();
    backend
        .insert_many(
            "accounts_2025",
            DOC_TYPE,
            vec![
                json!({ "name": "Umbrella", "employees": 9000, "revenue": 95000.0, "active": true }),
                json!({ "name": "", "employees": 1, "active": false }),
            ],
        )
        .unwrap();
    backend
        .insert_many("audit_2025", "audit", vec![json!({ "name": "login" })])
        .unwrap();
    Arc::new(backend)
}

pub fn open(backend: &Arc<MemoryBackend>) -> SearchRecordCursor<MemoryBackend> {
    open_with(backend, columns(), &ScrollConfig::default())
}

pub fn open_with(
    backend: &Arc<MemoryBackend>,
    columns: Vec<ColumnHandle>,
    config: &ScrollConfig,
) -> SearchRecordCursor<MemoryBackend> {
    SearchRecordCursor::new(Arc::clone(backend), &table(), columns, config).unwrap()
}

/// A backend holding `n` documents of a single `n` field in one index.
pub fn numbered_backend(n: usize) -> Arc<MemoryBackend> {
    let backend = MemoryBackend::new();
    backend
        .insert_many("numbers_0", "numbers", (0..n).map(|i| json!({ "n": i })))
        .unwrap();
    Arc::new(backend)
}

pub fn numbers_table() -> TableSource {
    TableSource {
        doc_type: "numbers".into(),
        index: "numbers".into(),
        ..table()
    }
}
