use std::collections::BTreeMap;
use std::time::Duration;

use http::{Response, StatusCode};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};
use ureq::{Agent, Body};

use crate::backend::SearchBackend;
use crate::error::ClientError;
use crate::protocol::{ScrollPage, SearchHit, SearchRequest, keep_alive_param};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpBackendConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Put the document type in the search path (`/{indices}/{type}/_search`).
    /// Clusters without mapping types need this off.
    pub typed_paths: bool,
    /// Upper bound on a single response body.
    pub max_response_bytes: u64,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9200".into(),
            timeout: Duration::from_secs(60),
            typed_paths: true,
            max_response_bytes: 512 * 1024 * 1024,
        }
    }
}

/// Blocking client for an Elasticsearch-compatible REST endpoint.
pub struct HttpBackend {
    agent: Agent,
    config: HttpBackendConfig,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        Self { agent, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<(StatusCode, String), ClientError> {
        let bytes = serde_json::to_vec(body)?;
        let mut response = self
            .agent
            .post(self.url(path))
            .header("content-type", "application/json")
            .send(&bytes[..])?;
        self.read(&mut response)
    }

    fn read(&self, response: &mut Response<Body>) -> Result<(StatusCode, String), ClientError> {
        let status = response.status();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.config.max_response_bytes)
            .read_to_string()?;
        Ok((status, body))
    }
}

impl SearchBackend for HttpBackend {
    fn index_names(&self) -> Result<Vec<String>, ClientError> {
        let mut response = self
            .agent
            .get(self.url("/_cluster/state/metadata?filter_path=metadata.indices.*.state"))
            .call()?;
        let (status, body) = self.read(&mut response)?;
        if !status.is_success() {
            return Err(server_error(status, body));
        }
        parse_index_names(&body)
    }

    fn search(&self, request: &SearchRequest) -> Result<ScrollPage, ClientError> {
        let path = search_path(request, self.config.typed_paths);
        debug!(%path, size = request.size, fields = request.fields.len(), "initial scroll search");
        let (status, body) = self.post_json(&path, &search_body(request))?;
        if !status.is_success() {
            return Err(server_error(status, body));
        }
        parse_page(&body).inspect_err(|_| {
            // The server opened a context the caller will never see.
            if let Some(scroll_id) = lenient_scroll_id(&body) {
                if let Err(e) = self.clear_scroll(&scroll_id) {
                    warn!(%scroll_id, error = %e, "failed to release scroll context");
                }
            }
        })
    }

    fn scroll(&self, scroll_id: &str, keep_alive: Duration) -> Result<ScrollPage, ClientError> {
        let body = json!({
            "scroll": keep_alive_param(keep_alive),
            "scroll_id": scroll_id,
        });
        let (status, body) = self.post_json("/_search/scroll", &body)?;
        if status == StatusCode::NOT_FOUND {
            Err(ClientError::ScrollExpired(scroll_id.to_string()))
        } else if status.is_success() {
            parse_page(&body)
        } else {
            Err(server_error(status, body))
        }
    }

    fn clear_scroll(&self, scroll_id: &str) -> Result<(), ClientError> {
        let bytes = serde_json::to_vec(&json!({ "scroll_id": [scroll_id] }))?;
        let mut response = self
            .agent
            .delete(self.url("/_search/scroll"))
            .force_send_body()
            .header("content-type", "application/json")
            .send(&bytes[..])?;
        let (status, body) = self.read(&mut response)?;
        // 404: the context already timed out on the server
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(server_error(status, body))
        }
    }
}

fn server_error(status: StatusCode, message: String) -> ClientError {
    ClientError::Server {
        status: status.as_u16(),
        message,
    }
}

fn search_path(request: &SearchRequest, typed: bool) -> String {
    let indices = request.indices.join(",");
    let scroll = keep_alive_param(request.keep_alive);
    if typed && !request.doc_type.is_empty() {
        format!("/{indices}/{}/_search?scroll={scroll}", request.doc_type)
    } else {
        format!("/{indices}/_search?scroll={scroll}")
    }
}

/// `_doc` order is the cheapest way to walk a scroll; no relevance scoring
/// and no global sort.
fn search_body(request: &SearchRequest) -> Value {
    json!({
        "size": request.size,
        "_source": false,
        "fields": request.fields,
        "sort": ["_doc"],
    })
}

#[derive(Deserialize)]
struct SearchResponseBody {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    #[serde(default)]
    hits: HitsBody,
}

#[derive(Default, Deserialize)]
struct HitsBody {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

fn parse_page(body: &str) -> Result<ScrollPage, ClientError> {
    let response: SearchResponseBody = serde_json::from_str(body)?;
    Ok(ScrollPage {
        scroll_id: response.scroll_id,
        hits: response.hits.hits,
    })
}

#[derive(Deserialize)]
struct ScrollIdBody {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
}

/// The scroll id of a response whose hits did not parse.
fn lenient_scroll_id(body: &str) -> Option<String> {
    serde_json::from_str::<ScrollIdBody>(body).ok()?.scroll_id
}

#[derive(Default, Deserialize)]
struct ClusterStateBody {
    #[serde(default)]
    metadata: MetadataBody,
}

#[derive(Default, Deserialize)]
struct MetadataBody {
    #[serde(default)]
    indices: BTreeMap<String, IgnoredAny>,
}

fn parse_index_names(body: &str) -> Result<Vec<String>, ClientError> {
    let state: ClusterStateBody = serde_json::from_str(body)?;
    Ok(state.metadata.indices.into_keys().collect())
}
