use std::time::Duration;

use crate::error::ClientError;
use crate::protocol::{ScrollPage, SearchRequest};

/// Read-only access to a search cluster's scroll API.
///
/// Handles are shared between readers, so every method takes `&self`.
/// A scroll context opened through [`search`](SearchBackend::search) belongs
/// to the caller that opened it and must be released with
/// [`clear_scroll`](SearchBackend::clear_scroll) once it is no longer needed.
pub trait SearchBackend: Send + Sync {
    /// Every concrete index name the cluster currently knows about.
    fn index_names(&self) -> Result<Vec<String>, ClientError>;

    /// Run the initial search and open a scroll context.
    fn search(&self, request: &SearchRequest) -> Result<ScrollPage, ClientError>;

    /// Fetch the next page of an open scroll, extending its keep-alive.
    fn scroll(&self, scroll_id: &str, keep_alive: Duration) -> Result<ScrollPage, ClientError>;

    /// Release a scroll context. Releasing an unknown or expired id is not an error.
    fn clear_scroll(&self, scroll_id: &str) -> Result<(), ClientError>;
}
