use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use serde_json::{Map, Value};

use crate::backend::SearchBackend;
use crate::error::ClientError;
use crate::protocol::{ScrollPage, SearchHit, SearchRequest};

struct StoredDocument {
    id: String,
    doc_type: String,
    source: Map<String, Value>,
}

struct ScrollContext {
    remaining: VecDeque<SearchHit>,
    size: usize,
}

#[derive(Default)]
struct ScrollState {
    next_id: u64,
    live: HashMap<String, ScrollContext>,
    cleared: Vec<String>,
    requests: Vec<SearchRequest>,
    continuation_keep_alives: Vec<Duration>,
    continuations: usize,
    fail_after: Option<usize>,
}

/// An in-process cluster with scroll semantics close to the real thing:
/// one shard per index, pages cut at `size`, and scroll contexts that stay
/// live until cleared or expired.
pub struct MemoryBackend {
    indices: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
    scrolls: Mutex<ScrollState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            indices: RwLock::new(BTreeMap::new()),
            scrolls: Mutex::new(ScrollState::default()),
        }
    }

    /// Create an empty index. Idempotent.
    pub fn create_index(&self, name: &str) {
        let mut indices = self.indices.write().unwrap();
        indices.entry(name.to_string()).or_default();
    }

    /// Store a document, creating the index if needed. `source` must be a
    /// JSON object.
    pub fn insert(
        &self,
        index: &str,
        doc_type: &str,
        id: impl Into<String>,
        source: Value,
    ) -> Result<(), ClientError> {
        let Value::Object(source) = source else {
            return Err(ClientError::Serialization(
                "document source must be a JSON object".into(),
            ));
        };
        let mut indices = self.indices.write().unwrap();
        indices
            .entry(index.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.into(),
                doc_type: doc_type.to_string(),
                source,
            });
        Ok(())
    }

    /// Store documents with generated ids (`{index}-{n}`).
    pub fn insert_many(
        &self,
        index: &str,
        doc_type: &str,
        docs: impl IntoIterator<Item = Value>,
    ) -> Result<(), ClientError> {
        let start = self
            .indices
            .read()
            .unwrap()
            .get(index)
            .map_or(0, Vec::len);
        for (n, doc) in docs.into_iter().enumerate() {
            self.insert(index, doc_type, format!("{index}-{}", start + n), doc)?;
        }
        Ok(())
    }

    /// Fail every continuation request after the first `pages` succeed.
    pub fn fail_after(&self, pages: usize) {
        self.scrolls.lock().unwrap().fail_after = Some(pages);
    }

    /// Drop every live scroll context, as if all keep-alives had lapsed.
    pub fn expire_scrolls(&self) {
        self.scrolls.lock().unwrap().live.clear();
    }

    pub fn live_scrolls(&self) -> usize {
        self.scrolls.lock().unwrap().live.len()
    }

    /// Ids released through [`clear_scroll`](SearchBackend::clear_scroll), in call order.
    pub fn cleared_scrolls(&self) -> Vec<String> {
        self.scrolls.lock().unwrap().cleared.clone()
    }

    /// Initial search requests received, in call order.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.scrolls.lock().unwrap().requests.clone()
    }

    /// Keep-alive sent with each continuation request, in call order.
    pub fn continuation_keep_alives(&self) -> Vec<Duration> {
        self.scrolls.lock().unwrap().continuation_keep_alives.clone()
    }

    fn matching_hits(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, ClientError> {
        let indices = self.indices.read().unwrap();
        let mut hits = Vec::new();
        for name in &request.indices {
            let docs = indices.get(name).ok_or_else(|| ClientError::Server {
                status: 404,
                message: format!("no such index [{name}]"),
            })?;
            hits.extend(
                docs.iter()
                    .filter(|d| request.doc_type.is_empty() || d.doc_type == request.doc_type)
                    .map(|d| SearchHit {
                        index: name.clone(),
                        id: d.id.clone(),
                        fields: project(&d.source, &request.fields),
                    }),
            );
        }
        Ok(hits)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBackend for MemoryBackend {
    fn index_names(&self) -> Result<Vec<String>, ClientError> {
        Ok(self.indices.read().unwrap().keys().cloned().collect())
    }

    fn search(&self, request: &SearchRequest) -> Result<ScrollPage, ClientError> {
        let hits = self.matching_hits(request)?;
        let mut scrolls = self.scrolls.lock().unwrap();
        scrolls.requests.push(request.clone());
        scrolls.next_id += 1;
        let scroll_id = format!("scroll-{}", scrolls.next_id);

        let mut context = ScrollContext {
            remaining: hits.into(),
            size: request.size.max(1),
        };
        let page = take_page(&mut context);
        scrolls.live.insert(scroll_id.clone(), context);

        Ok(ScrollPage {
            scroll_id: Some(scroll_id),
            hits: page,
        })
    }

    fn scroll(&self, scroll_id: &str, keep_alive: Duration) -> Result<ScrollPage, ClientError> {
        let mut scrolls = self.scrolls.lock().unwrap();
        scrolls.continuation_keep_alives.push(keep_alive);
        scrolls.continuations += 1;
        if scrolls.fail_after.is_some_and(|n| scrolls.continuations > n) {
            return Err(ClientError::Server {
                status: 500,
                message: "injected failure".into(),
            });
        }

        let context = scrolls
            .live
            .get_mut(scroll_id)
            .ok_or_else(|| ClientError::ScrollExpired(scroll_id.to_string()))?;
        Ok(ScrollPage {
            scroll_id: Some(scroll_id.to_string()),
            hits: take_page(context),
        })
    }

    fn clear_scroll(&self, scroll_id: &str) -> Result<(), ClientError> {
        let mut scrolls = self.scrolls.lock().unwrap();
        scrolls.live.remove(scroll_id);
        scrolls.cleared.push(scroll_id.to_string());
        Ok(())
    }
}

fn take_page(context: &mut ScrollContext) -> Vec<SearchHit> {
    let n = context.size.min(context.remaining.len());
    context.remaining.drain(..n).collect()
}

/// Pick `fields` out of a source document. Dotted paths walk nested
/// objects; arrays are flattened into the value list; nulls are dropped.
fn project(source: &Map<String, Value>, fields: &[String]) -> BTreeMap<String, Vec<Value>> {
    let mut projected = BTreeMap::new();
    for field in fields {
        let Some(value) = lookup(source, field) else {
            continue;
        };
        let values: Vec<Value> = match value {
            Value::Array(items) => items.iter().filter(|v| !v.is_null()).cloned().collect(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        };
        if !values.is_empty() {
            projected.insert(field.clone(), values);
        }
    }
    projected
}

fn lookup<'a>(source: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = source.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let mut current = source.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(indices: &[&str], fields: &[&str], size: usize) -> SearchRequest {
        SearchRequest {
            indices: indices.iter().map(|s| s.to_string()).collect(),
            doc_type: "t".into(),
            fields: fields.iter().map(|s| s.to_string()).collect(),
            size,
            keep_alive: Duration::from_secs(60),
        }
    }

    #[test]
    fn project_wraps_scalars_and_walks_paths() {
        let source = json!({
            "name": "Acme",
            "tags": ["a", "b"],
            "address": {"city": "Oslo"},
            "gone": null,
        });
        let Value::Object(source) = source else {
            unreachable!()
        };
        let fields = ["name", "tags", "address.city", "gone", "missing"].map(String::from);
        let projected = project(&source, &fields);

        assert_eq!(projected["name"], vec![json!("Acme")]);
        assert_eq!(projected["tags"], vec![json!("a"), json!("b")]);
        assert_eq!(projected["address.city"], vec![json!("Oslo")]);
        assert!(!projected.contains_key("gone"));
        assert!(!projected.contains_key("missing"));
    }

    #[test]
    fn search_pages_by_size_and_filters_type() {
        let backend = MemoryBackend::new();
        backend
            .insert_many("t_1", "t", (0..5).map(|i| json!({ "n": i })))
            .unwrap();
        backend.insert("t_1", "other", "x", json!({ "n": 99 })).unwrap();

        let first = backend.search(&request(&["t_1"], &["n"], 2)).unwrap();
        let id = first.scroll_id.clone().unwrap();
        assert_eq!(first.hits.len(), 2);
        assert_eq!(first.hits[0].id, "t_1-0");

        let keep_alive = Duration::from_secs(600);
        assert_eq!(backend.scroll(&id, keep_alive).unwrap().hits.len(), 2);
        assert_eq!(backend.scroll(&id, keep_alive).unwrap().hits.len(), 1);
        assert!(backend.scroll(&id, keep_alive).unwrap().hits.is_empty());
        assert_eq!(backend.live_scrolls(), 1);

        backend.clear_scroll(&id).unwrap();
        assert_eq!(backend.live_scrolls(), 0);
        assert_eq!(backend.cleared_scrolls(), vec![id]);
    }

    #[test]
    fn missing_index_is_a_server_error() {
        let backend = MemoryBackend::new();
        let err = backend.search(&request(&["nope"], &[], 10)).unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 404, .. }));
    }

    #[test]
    fn expired_scroll_is_reported() {
        let backend = MemoryBackend::new();
        backend.create_index("t_1");
        let page = backend.search(&request(&["t_1"], &[], 10)).unwrap();
        backend.expire_scrolls();
        let err = backend
            .scroll(&page.scroll_id.unwrap(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ClientError::ScrollExpired(_)));
    }

    #[test]
    fn non_object_source_is_rejected() {
        let backend = MemoryBackend::new();
        assert!(backend.insert("t_1", "t", "1", json!([1, 2])).is_err());
    }
}
