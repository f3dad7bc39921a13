//! Shared fixtures: a surface that records every render instruction, store
//! wrappers that count or fail calls, and a canned clipboard.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use clipview_core::clipboard::ClipboardWriter;
use clipview_core::{
    MemStore, Prefs, Record, RecordsQuery, SearchQuery, SearchSummary, StoreClient,
};
use clipview_manager::focus::FocusChannel;
use clipview_manager::surface::Surface;
use clipview_manager::view::{Manager, ManagerConfig};

/// Everything a surface can be told, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    AddRow(String),
    Clear(String),
    Select,
    RemoveRow(String),
    SetPinned(String, bool),
    Status(String),
    Alert(String),
    Confirm(String),
    Close,
}

#[derive(Default)]
pub struct RecordingSurface {
    ops: Mutex<Vec<Op>>,
    confirm_answer: AtomicBool,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answering_confirms_with(accept: bool) -> Arc<Self> {
        let s = Self::new();
        s.confirm_answer.store(accept, Ordering::SeqCst);
        s
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.lock().unwrap().iter().filter(|op| pred(op)).count()
    }

    fn push(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl Surface for RecordingSurface {
    fn add_row(&self, record: &Record) {
        self.push(Op::AddRow(record.guid.clone()));
    }

    fn clear(&self, message: &str) {
        self.push(Op::Clear(message.to_string()));
    }

    fn select(&self) {
        self.push(Op::Select);
    }

    fn remove_row(&self, guid: &str) {
        self.push(Op::RemoveRow(guid.to_string()));
    }

    fn set_pinned(&self, guid: &str, pinned: bool) {
        self.push(Op::SetPinned(guid.to_string(), pinned));
    }

    fn status(&self, text: &str) {
        self.push(Op::Status(text.to_string()));
    }

    fn alert(&self, message: &str) {
        self.push(Op::Alert(message.to_string()));
    }

    async fn confirm(&self, message: &str) -> bool {
        self.push(Op::Confirm(message.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.push(Op::Close);
    }
}

#[derive(Default)]
pub struct CountingFocus {
    pub restored: Mutex<Vec<i32>>,
}

#[async_trait]
impl FocusChannel for CountingFocus {
    async fn restore(&self, pid: i32) -> Result<()> {
        self.restored.lock().unwrap().push(pid);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingClipboard {
    pub written: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl ClipboardWriter for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("clipboard unavailable");
        }
        self.written.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Delegates to a `MemStore` while counting record-page fetches and
/// optionally failing chosen operations.
pub struct CountingStore {
    pub inner: MemStore,
    pub records_calls: AtomicUsize,
    pub fail_records: AtomicBool,
    pub fail_search: AtomicBool,
    pub fail_add: AtomicBool,
    pub fail_remove: AtomicBool,
}

impl CountingStore {
    pub fn new(inner: MemStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            records_calls: AtomicUsize::new(0),
            fail_records: AtomicBool::new(false),
            fail_search: AtomicBool::new(false),
            fail_add: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl StoreClient for CountingStore {
    async fn records(&self, query: RecordsQuery) -> Result<Vec<Record>> {
        self.records_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_records.load(Ordering::SeqCst) {
            bail!("records fetch refused");
        }
        self.inner.records(query).await
    }

    async fn search(&self, query: SearchQuery) -> Result<Option<SearchSummary>> {
        if self.fail_search.load(Ordering::SeqCst) {
            bail!("search refused");
        }
        self.inner.search(query).await
    }

    async fn search_body(&self, index: usize) -> Result<Record> {
        self.inner.search_body(index).await
    }

    async fn add(&self, record: Record) -> Result<()> {
        if self.fail_add.load(Ordering::SeqCst) {
            bail!("record is read-only");
        }
        self.inner.add(record).await
    }

    async fn remove(&self, guid: &str) -> Result<()> {
        if self.fail_remove.load(Ordering::SeqCst) {
            bail!("record is protected");
        }
        self.inner.remove(guid).await
    }
}

/// `n` records, newest first: `g0` is the most recent, bodies `"body <i>"`.
pub fn seeded_store(n: usize) -> MemStore {
    MemStore::with_records((0..n).map(|i| Record::new(format!("g{i}"), format!("body {i}"))))
}

pub struct Fixture {
    pub manager: Arc<Manager>,
    pub surface: Arc<RecordingSurface>,
    pub clipboard: Arc<RecordingClipboard>,
    pub focus: Arc<CountingFocus>,
}

pub fn manager_with(store: Arc<dyn StoreClient>, prefs: Prefs, pid: i32) -> Fixture {
    manager_with_surface(store, prefs, pid, RecordingSurface::new())
}

pub fn manager_with_surface(
    store: Arc<dyn StoreClient>,
    prefs: Prefs,
    pid: i32,
    surface: Arc<RecordingSurface>,
) -> Fixture {
    let clipboard = Arc::new(RecordingClipboard::default());
    let focus = Arc::new(CountingFocus::default());
    let manager = Arc::new(Manager::new(ManagerConfig {
        store,
        surface: surface.clone(),
        clipboard: clipboard.clone(),
        focus: focus.clone(),
        prefs,
        target_pid: pid,
    }));
    Fixture {
        manager,
        surface,
        clipboard,
        focus,
    }
}
