use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Initial scroll search: which indices and type to read, which fields to
/// project, and how long the server should keep the scroll context alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub indices: Vec<String>,
    pub doc_type: String,
    pub fields: Vec<String>,
    /// Maximum hits returned by each request of the scroll.
    pub size: usize,
    pub keep_alive: Duration,
}

/// One page of a scroll. An empty `hits` list on a continuation page means
/// the scroll is finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPage {
    pub scroll_id: Option<String>,
    pub hits: Vec<SearchHit>,
}

/// A single document. The server wraps every field value in a list, even
/// single-valued ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<Value>>,
}

/// Render a keep-alive as a time unit string the server accepts.
pub fn keep_alive_param(keep_alive: Duration) -> String {
    format!("{}ms", keep_alive.as_millis())
}
