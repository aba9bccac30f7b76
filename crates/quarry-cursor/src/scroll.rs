use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use quarry_search::{ScrollPage, SearchBackend, SearchHit, SearchRequest};
use tracing::{debug, warn};

use crate::config::ScrollConfig;
use crate::error::CursorError;

/// Walks a server-side scroll one page at a time.
///
/// The initial search runs in [`open`](ScrollFetcher::open); every later
/// page is requested only once the previous one has been drained, so at
/// most one page is held in memory. Hits come out in page arrival order and
/// in response order within a page.
///
/// The fetcher owns its scroll context and releases it when the scroll runs
/// dry, when a page request fails, on [`close`](ScrollFetcher::close), or on
/// drop, whichever comes first. A failed page request is fatal: the error is
/// yielded once and the iterator is finished afterwards.
pub struct ScrollFetcher<B: SearchBackend + ?Sized> {
    backend: Arc<B>,
    scroll_id: Option<String>,
    buffer: VecDeque<SearchHit>,
    continuation_keep_alive: Duration,
    done: bool,
    pages: usize,
    hits: u64,
}

impl<B: SearchBackend + ?Sized> ScrollFetcher<B> {
    /// Run the initial search. With no indices there is nothing to search
    /// and no request is made; the fetcher starts out finished. A zero page
    /// size is sent as one.
    pub fn open(
        backend: Arc<B>,
        indices: &[String],
        doc_type: &str,
        fields: &[String],
        config: &ScrollConfig,
    ) -> Result<Self, CursorError> {
        let mut fetcher = Self {
            backend,
            scroll_id: None,
            buffer: VecDeque::new(),
            continuation_keep_alive: config.continuation_keep_alive,
            done: indices.is_empty(),
            pages: 0,
            hits: 0,
        };
        if fetcher.done {
            debug!(doc_type, "no indices to search");
            return Ok(fetcher);
        }

        let request = SearchRequest {
            indices: indices.to_vec(),
            doc_type: doc_type.to_string(),
            fields: fields.to_vec(),
            size: config.page_size.max(1),
            keep_alive: config.initial_keep_alive,
        };
        let page = fetcher.backend.search(&request)?;
        fetcher.accept(page, true);
        Ok(fetcher)
    }

    /// Drain the whole scroll into memory.
    pub fn collect_all(mut self) -> Result<Vec<SearchHit>, CursorError> {
        self.by_ref().collect()
    }

    /// Release the scroll context and drop anything still buffered.
    /// Calling it again does nothing.
    pub fn close(&mut self) {
        self.buffer.clear();
        self.done = true;
        self.release();
    }

    pub fn is_exhausted(&self) -> bool {
        self.done && self.buffer.is_empty()
    }

    /// Pages received so far, the initial search included.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    pub fn hits_fetched(&self) -> u64 {
        self.hits
    }

    /// The live scroll id, if a context is still held.
    pub fn scroll_id(&self) -> Option<&str> {
        self.scroll_id.as_deref()
    }

    fn accept(&mut self, page: ScrollPage, initial: bool) {
        self.pages += 1;
        if let Some(id) = page.scroll_id {
            self.scroll_id = Some(id);
        }
        // Scan-style searches return their first hits on the first
        // continuation, so only a later empty page ends the scroll.
        if page.hits.is_empty() && !initial {
            debug!(pages = self.pages, hits = self.hits, "scroll finished");
            self.done = true;
            self.release();
            return;
        }
        if self.scroll_id.is_none() {
            self.done = true;
        }
        self.hits += page.hits.len() as u64;
        self.buffer.extend(page.hits);
    }

    fn fetch_next(&mut self) -> Result<(), CursorError> {
        let Some(scroll_id) = self.scroll_id.clone() else {
            self.done = true;
            return Ok(());
        };
        match self.backend.scroll(&scroll_id, self.continuation_keep_alive) {
            Ok(page) => {
                self.accept(page, false);
                Ok(())
            }
            Err(e) => {
                self.done = true;
                self.release();
                Err(e.into())
            }
        }
    }

    fn release(&mut self) {
        let Some(scroll_id) = self.scroll_id.take() else {
            return;
        };
        match self.backend.clear_scroll(&scroll_id) {
            Ok(()) => debug!(%scroll_id, "released scroll context"),
            Err(e) => warn!(%scroll_id, error = %e, "failed to release scroll context"),
        }
    }
}

impl<B: SearchBackend + ?Sized> Iterator for ScrollFetcher<B> {
    type Item = Result<SearchHit, CursorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(hit) = self.buffer.pop_front() {
                return Some(Ok(hit));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.fetch_next() {
                return Some(Err(e));
            }
        }
    }
}

impl<B: SearchBackend + ?Sized> Drop for ScrollFetcher<B> {
    fn drop(&mut self) {
        self.release();
    }
}
