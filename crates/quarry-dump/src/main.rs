use std::io::{self, Write};
use std::process::ExitCode;

use http::Uri;
use quarry_cursor::{
    ColumnHandle, ColumnType, CursorError, RecordCursor, ScrollConfig, SearchRecordCursor,
    TableSource,
};
use quarry_search::{BackendRegistry, HttpBackend, HttpBackendConfig};
use serde_json::{Map, Number, Value};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: quarry-dump <doc_type> <name:path:type>...";
const DEFAULT_LOG: &str = "info";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((doc_type, specs)) = args.split_first() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let columns = match specs
        .iter()
        .map(|s| parse_column(s))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(columns) if !columns.is_empty() => columns,
        Ok(_) => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let url = std::env::var("QUARRY_URL").unwrap_or_else(|_| "http://127.0.0.1:9200".into());
    let cluster = std::env::var("QUARRY_CLUSTER").unwrap_or_else(|_| "default".into());
    let index = std::env::var("QUARRY_INDEX").unwrap_or_else(|_| doc_type.clone());
    let typed_paths = std::env::var("QUARRY_UNTYPED").is_err();

    let table = match table_source(&url, &cluster, &index, doc_type) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let mut registry = BackendRegistry::new();
    registry.register(
        cluster,
        HttpBackend::new(HttpBackendConfig {
            base_url: url,
            typed_paths,
            ..Default::default()
        }),
    );

    match dump(&registry, &table, columns, &ScrollConfig::from_env()) {
        Ok(rows) => {
            info!(rows, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` directives, or `info` when unset or unparsable.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG))
}

fn dump(
    registry: &BackendRegistry<HttpBackend>,
    table: &TableSource,
    columns: Vec<ColumnHandle>,
    config: &ScrollConfig,
) -> Result<u64, CursorError> {
    let backend = registry.get(&table.cluster)?;
    let mut cursor = SearchRecordCursor::new(backend, table, columns, config)?;
    info!(indices = ?cursor.indices(), doc_type = %table.doc_type, "scrolling");

    let mut out = io::stdout().lock();
    let mut rows = 0;
    while cursor.advance_next_position()? {
        let row = row_json(&cursor, cursor.columns())?;
        if writeln!(out, "{}", Value::Object(row)).is_err() {
            // reader went away
            break;
        }
        rows += 1;
    }
    cursor.close();
    Ok(rows)
}

fn row_json(
    cursor: &impl RecordCursor,
    columns: &[ColumnHandle],
) -> Result<Map<String, Value>, CursorError> {
    let mut row = Map::with_capacity(columns.len());
    for (field, column) in columns.iter().enumerate() {
        let value = if cursor.is_null(field)? {
            Value::Null
        } else {
            match column.column_type {
                ColumnType::Boolean => Value::Bool(cursor.get_boolean(field)?),
                ColumnType::Bigint => Value::from(cursor.get_long(field)?),
                ColumnType::Double => Number::from_f64(cursor.get_double(field)?)
                    .map_or(Value::Null, Value::Number),
                ColumnType::Varchar => Value::String(cursor.get_text(field)?.to_string()),
            }
        };
        row.insert(column.name.clone(), value);
    }
    Ok(row)
}

fn parse_column(spec: &str) -> Result<ColumnHandle, String> {
    let mut parts = spec.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(path), Some(column_type)) if !name.is_empty() && !path.is_empty() => {
            Ok(ColumnHandle::new(name, path, column_type.parse()?))
        }
        _ => Err(format!(
            "invalid column {spec:?}: expected name:path:type"
        )),
    }
}

fn table_source(
    url: &str,
    cluster: &str,
    index: &str,
    doc_type: &str,
) -> Result<TableSource, String> {
    let uri: Uri = url
        .parse()
        .map_err(|e| format!("invalid QUARRY_URL {url:?}: {e}"))?;
    let host = uri
        .host()
        .ok_or_else(|| format!("QUARRY_URL {url:?} has no host"))?
        .to_string();
    let port = uri.port_u16().unwrap_or(match uri.scheme_str() {
        Some("https") => 443,
        _ => 80,
    });
    Ok(TableSource {
        cluster: cluster.to_string(),
        host,
        port,
        index: index.to_string(),
        doc_type: doc_type.to_string(),
    })
}
