//! clipview-core: record model, store port, and minimal in-memory backend

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub type Guid = String;

/// A clipboard history entry. The backing store owns these; the view layer
/// only holds transient copies for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub guid: Guid,
    pub body: String,
    pub pinned: bool,
    /// 0-based rank from the most recent item. Assigned by the view while
    /// browsing; the store does not maintain it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl Record {
    pub fn new(guid: impl Into<Guid>, body: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            body: body.into(),
            pinned: false,
            index: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Page backward through recency order, i.e. "older than offset".
    Prev,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsQuery {
    pub number: usize,
    pub offset: usize,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    /// Maximum number of result bodies the store will serve.
    pub length: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchSummary {
    /// Number of bodies available through `search_body`.
    pub size: usize,
    /// Store's estimate of the total match count.
    pub estimated: usize,
}

/// Async facade over the record store. Implementations keep the result set
/// of the most recent `search` so `search_body` can serve it by index.
#[async_trait::async_trait]
pub trait StoreClient: Send + Sync {
    async fn records(&self, q: RecordsQuery) -> anyhow::Result<Vec<Record>>;
    /// `None` is treated by callers as zero matches.
    async fn search(&self, q: SearchQuery) -> anyhow::Result<Option<SearchSummary>>;
    /// Body of the i-th hit of the last `search` on this client.
    async fn search_body(&self, index: usize) -> anyhow::Result<Record>;
    /// Full-record write. An existing guid is updated in place (this is how
    /// pin toggling is persisted); a new guid becomes the most recent entry.
    async fn add(&self, record: Record) -> anyhow::Result<()>;
    async fn remove(&self, guid: &str) -> anyhow::Result<()>;
}

/// Preference set the manager view reads once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefs {
    /// Items fetched per page while browsing.
    pub page_size: usize,
    /// Maximum search results served per query.
    pub search_limit: usize,
    /// Close the view when it loses focus.
    pub hide_on_inactive: bool,
    /// Hand focus back to the previously active process on exit.
    pub return_focus: bool,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            page_size: 10,
            search_limit: 20,
            hide_on_inactive: false,
            return_focus: true,
        }
    }
}

/// In-memory store, newest entry first. Backs tests and local mode.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Vec<Record>>,
    // guids of the last search's served set, in relevance order
    hits: Mutex<Vec<Guid>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I: IntoIterator<Item = Record>>(records: I) -> Self {
        Self {
            inner: Mutex::new(records.into_iter().collect()),
            hits: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, guid: &str) -> Option<Record> {
        let v = self.inner.lock().unwrap();
        v.iter().find(|r| r.guid == guid).cloned()
    }
}

#[async_trait::async_trait]
impl StoreClient for MemStore {
    async fn records(&self, q: RecordsQuery) -> anyhow::Result<Vec<Record>> {
        let Direction::Prev = q.direction;
        let v = self.inner.lock().unwrap();
        let start = q.offset.min(v.len());
        let end = (start + q.number).min(v.len());
        Ok(v[start..end].to_vec())
    }

    async fn search(&self, q: SearchQuery) -> anyhow::Result<Option<SearchSummary>> {
        let needle = q.query.to_lowercase();
        let v = self.inner.lock().unwrap();
        let matches: Vec<Guid> = v
            .iter()
            .filter(|r| r.body.to_lowercase().contains(&needle))
            .map(|r| r.guid.clone())
            .collect();
        let estimated = matches.len();
        let size = estimated.min(q.length);
        let mut hits = self.hits.lock().unwrap();
        *hits = matches;
        hits.truncate(size);
        Ok(Some(SearchSummary { size, estimated }))
    }

    async fn search_body(&self, index: usize) -> anyhow::Result<Record> {
        let guid = {
            let hits = self.hits.lock().unwrap();
            hits.get(index)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no search result at index {index}"))?
        };
        let v = self.inner.lock().unwrap();
        let mut record = v
            .iter()
            .find(|r| r.guid == guid)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("search result {guid} no longer exists"))?;
        record.index = Some(index);
        Ok(record)
    }

    async fn add(&self, record: Record) -> anyhow::Result<()> {
        let mut record = record;
        record.index = None;
        let mut v = self.inner.lock().unwrap();
        match v.iter_mut().find(|r| r.guid == record.guid) {
            // update keeps the entry's position in recency order
            Some(existing) => *existing = record,
            None => v.insert(0, record),
        }
        Ok(())
    }

    async fn remove(&self, guid: &str) -> anyhow::Result<()> {
        let mut v = self.inner.lock().unwrap();
        let before = v.len();
        v.retain(|r| r.guid != guid);
        if v.len() == before {
            anyhow::bail!("no such record: {guid}");
        }
        Ok(())
    }
}

/// Clipboard write primitive. Copy is the last act of a manager session,
/// so there is no read side here.
pub mod clipboard {
    use anyhow::Result;

    #[async_trait::async_trait]
    pub trait ClipboardWriter: Send + Sync {
        async fn write_text(&self, body: &str) -> Result<()>;
    }

    #[derive(Default)]
    pub struct NoopClipboard;

    #[async_trait::async_trait]
    impl ClipboardWriter for NoopClipboard {
        async fn write_text(&self, _body: &str) -> Result<()> {
            Ok(())
        }
    }

    #[cfg(feature = "clipboard")]
    #[derive(Default)]
    pub struct ArboardClipboard;

    #[cfg(feature = "clipboard")]
    impl ArboardClipboard {
        pub fn new() -> Self {
            Self
        }
    }

    #[cfg(feature = "clipboard")]
    #[async_trait::async_trait]
    impl ClipboardWriter for ArboardClipboard {
        async fn write_text(&self, body: &str) -> Result<()> {
            let mut cb = arboard::Clipboard::new()?;
            cb.set_text(body.to_string())?;
            Ok(())
        }
    }
}
