//! View state controller: owns the visible row sequence and the
//! browse/search mode, and keeps them consistent while page fetches and
//! search sessions race over the async store.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use clipview_core::clipboard::ClipboardWriter;
use clipview_core::{Direction, Prefs, Record, RecordsQuery, SearchQuery, StoreClient};
use tracing::{debug, warn};

use crate::focus::FocusChannel;
use crate::lifecycle::Lifecycle;
use crate::surface::Surface;

/// Placeholder shown while the store has no records at all.
pub const BLANK: &str = "Empty database! Copy some text to add the first entry";
pub const NO_RESULT: &str = "No result for this search";
pub const PINNED_CONFIRM: &str = "This item is pinned, are you sure you want to remove it?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Browse,
    Search,
}

pub(crate) struct ViewState {
    pub(crate) mode: ViewMode,
    pub(crate) rows: Vec<Record>,
    /// Bumped whenever a new fetch or search supersedes whatever is in
    /// flight. Async steps compare their captured value before touching the
    /// rows; a mismatch means the result is stale and gets dropped.
    pub(crate) epoch: u64,
}

/// Everything the controller needs, handed over once at construction.
pub struct ManagerConfig {
    pub store: Arc<dyn StoreClient>,
    pub surface: Arc<dyn Surface>,
    pub clipboard: Arc<dyn ClipboardWriter>,
    pub focus: Arc<dyn FocusChannel>,
    pub prefs: Prefs,
    /// Process to hand focus back to on exit; `focus::NO_PROCESS` disables it.
    pub target_pid: i32,
}

pub struct Manager {
    pub(crate) store: Arc<dyn StoreClient>,
    pub(crate) surface: Arc<dyn Surface>,
    pub(crate) clipboard: Arc<dyn ClipboardWriter>,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) prefs: Prefs,
    pub(crate) state: Mutex<ViewState>,
    /// Serializes pin toggles so a rollback always restores the last
    /// store-confirmed flag, not another toggle's in-flight value.
    pub(crate) pin_gate: tokio::sync::Mutex<()>,
}

impl Manager {
    pub fn new(cfg: ManagerConfig) -> Self {
        let lifecycle = Lifecycle::new(
            cfg.surface.clone(),
            cfg.focus,
            cfg.target_pid,
            cfg.prefs.return_focus,
        );
        Self {
            store: cfg.store,
            surface: cfg.surface,
            clipboard: cfg.clipboard,
            lifecycle,
            prefs: cfg.prefs,
            state: Mutex::new(ViewState {
                mode: ViewMode::Browse,
                rows: Vec::new(),
                epoch: 0,
            }),
            pin_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.state.lock().unwrap().mode
    }

    /// Snapshot of the visible sequence, in render order.
    pub fn rows(&self) -> Vec<Record> {
        self.state.lock().unwrap().rows.clone()
    }

    pub fn is_exiting(&self) -> bool {
        self.lifecycle.is_exiting()
    }

    /// Browse mode, first page, selection on the first row. A failure here
    /// is fatal to startup, unlike every later per-action failure.
    pub async fn initialize(&self) -> Result<()> {
        let token = self.enter_browse();
        let fetched = self.fetch_page(0, token, true).await?;
        if fetched == Some(0) {
            self.surface.clear(BLANK);
        }
        Ok(())
    }

    /// The renderer reports that row `index` (its current last row) came
    /// into view. Index 0 is ignored: refetching from the top would
    /// duplicate the whole view. A store with less than one page of records
    /// therefore never paginates past a last row at index 0.
    pub async fn reached_last_row(&self, index: usize) -> Result<()> {
        if index == 0 {
            return Ok(());
        }
        let token = self.state.lock().unwrap().epoch;
        if let Err(e) = self.fetch_page(index + 1, token, false).await {
            warn!("page fetch failed: {e}");
            self.surface.status(&format!("An error occurred: {e}"));
        }
        Ok(())
    }

    /// Empty text leaves the overlay and reloads browse mode from the top;
    /// anything else starts a new search session that supersedes whatever
    /// was in flight.
    pub async fn set_search_query(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            let token = self.enter_browse();
            self.surface.clear(BLANK);
            self.surface.status("");
            if let Err(e) = self.fetch_page(0, token, true).await {
                warn!("browse reload failed: {e}");
                self.surface.clear(&format!("An error occurred: {e}"));
            }
            return Ok(());
        }

        let token = {
            let mut st = self.state.lock().unwrap();
            st.epoch += 1;
            st.mode = ViewMode::Search;
            st.rows.clear();
            st.epoch
        };
        self.surface.clear("");

        let summary = match self
            .store
            .search(SearchQuery {
                query: text.to_string(),
                length: self.prefs.search_limit,
            })
            .await
        {
            Ok(s) => s.unwrap_or_default(),
            Err(e) => {
                warn!("search failed: {e}");
                if self.live(token) {
                    self.surface.clear(&format!("An error occurred: {e}"));
                }
                return Ok(());
            }
        };

        // bodies are fetched one by one so the view fills in relevance order
        for i in 0..summary.size {
            let record = match self.store.search_body(i).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("search body {i} failed: {e}");
                    if self.live(token) {
                        self.surface.clear(&format!("An error occurred: {e}"));
                    }
                    return Ok(());
                }
            };
            let mut st = self.state.lock().unwrap();
            if st.epoch != token {
                debug!(hit = i, "search superseded; dropping remaining results");
                return Ok(());
            }
            if st.rows.iter().all(|r| r.guid != record.guid) {
                self.surface.add_row(&record);
                st.rows.push(record);
            }
        }

        if !self.live(token) {
            return Ok(());
        }
        self.surface.select();
        self.surface.status(&format!("matches: {}", summary.estimated));
        if summary.size == 0 {
            self.surface.clear(NO_RESULT);
        }
        Ok(())
    }

    /// Copy a visible record's body to the clipboard, then leave the view.
    pub async fn copy(&self, guid: &str) -> Result<()> {
        let body = {
            let st = self.state.lock().unwrap();
            st.rows.iter().find(|r| r.guid == guid).map(|r| r.body.clone())
        };
        let Some(body) = body else {
            return Ok(());
        };
        if let Err(e) = self.clipboard.write_text(&body).await {
            warn!("clipboard write failed: {e}");
            self.surface.alert(&e.to_string());
            return Ok(());
        }
        self.lifecycle.exit().await;
        Ok(())
    }

    pub async fn blur(&self) {
        if self.prefs.hide_on_inactive {
            self.lifecycle.exit().await;
        }
    }

    pub async fn escape(&self) {
        self.lifecycle.exit().await;
    }

    fn enter_browse(&self) -> u64 {
        let mut st = self.state.lock().unwrap();
        st.epoch += 1;
        st.mode = ViewMode::Browse;
        st.rows.clear();
        st.epoch
    }

    pub(crate) fn live(&self, token: u64) -> bool {
        self.state.lock().unwrap().epoch == token
    }

    /// Fetch one browse page and append it, deduplicating by guid. Returns
    /// how many records the store sent, or `None` when the result arrived
    /// stale (mode switch or newer fetch) and was dropped.
    async fn fetch_page(&self, offset: usize, token: u64, select: bool) -> Result<Option<usize>> {
        let records = self
            .store
            .records(RecordsQuery {
                number: self.prefs.page_size,
                offset,
                direction: Direction::Prev,
            })
            .await?;
        let fetched = records.len();
        let mut st = self.state.lock().unwrap();
        if st.epoch != token || st.mode != ViewMode::Browse {
            debug!(offset, fetched, "page fetch superseded; dropping records");
            return Ok(None);
        }
        for (i, mut record) in records.into_iter().enumerate() {
            record.index = Some(offset + i);
            if st.rows.iter().any(|r| r.guid == record.guid) {
                continue;
            }
            self.surface.add_row(&record);
            st.rows.push(record);
        }
        if select && !st.rows.is_empty() {
            self.surface.select();
        }
        Ok(Some(fetched))
    }
}
