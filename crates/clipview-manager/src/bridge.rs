//! Stdio bridge: input events arrive as JSON lines on stdin, render
//! instructions leave as JSON lines on stdout.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clipview_core::Record;
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, Notify};
use tracing::warn;

use crate::surface::Surface;

/// One line of user input from the renderer.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum InputEvent {
    Copy { guid: String },
    LastRow { index: usize },
    TogglePin { guid: String },
    Trash { guid: String },
    Search { text: String },
    Blur,
    Escape,
    /// Answer to a pending `confirm` instruction.
    Confirm { accept: bool },
}

/// One line of render output for the renderer.
#[derive(Debug, Serialize)]
#[serde(tag = "render", rename_all = "kebab-case")]
pub enum Instruction<'a> {
    AddRow { record: &'a Record },
    Clear { message: &'a str },
    Select,
    RemoveRow { guid: &'a str },
    SetPinned { guid: &'a str, pinned: bool },
    Status { text: &'a str },
    Alert { message: &'a str },
    Confirm { message: &'a str },
    Close,
}

/// Surface that writes instructions to an output stream, one JSON object
/// per line. `confirm` parks on a oneshot until the event loop feeds the
/// renderer's answer back through `resolve_confirm`.
pub struct StdioSurface {
    out: Mutex<Box<dyn Write + Send>>,
    pending_confirm: Mutex<Option<oneshot::Sender<bool>>>,
    closed: Arc<Notify>,
}

impl StdioSurface {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            pending_confirm: Mutex::new(None),
            closed: Arc::new(Notify::new()),
        }
    }

    /// Notified once when `close` is emitted; the permit is stored, so a
    /// waiter that subscribes afterwards still wakes.
    pub fn closed(&self) -> Arc<Notify> {
        self.closed.clone()
    }

    /// Deliver the renderer's answer to the pending confirm, if any.
    pub fn resolve_confirm(&self, accept: bool) {
        if let Some(tx) = self.pending_confirm.lock().unwrap().take() {
            let _ = tx.send(accept);
        }
    }

    fn emit(&self, instruction: &Instruction<'_>) {
        let mut out = self.out.lock().unwrap();
        let write = serde_json::to_string(instruction)
            .map_err(anyhow::Error::from)
            .and_then(|line| {
                writeln!(out, "{line}")?;
                out.flush()?;
                Ok(())
            });
        if let Err(e) = write {
            warn!("render instruction dropped: {e}");
        }
    }
}

#[async_trait]
impl Surface for StdioSurface {
    fn add_row(&self, record: &Record) {
        self.emit(&Instruction::AddRow { record });
    }

    fn clear(&self, message: &str) {
        self.emit(&Instruction::Clear { message });
    }

    fn select(&self) {
        self.emit(&Instruction::Select);
    }

    fn remove_row(&self, guid: &str) {
        self.emit(&Instruction::RemoveRow { guid });
    }

    fn set_pinned(&self, guid: &str, pinned: bool) {
        self.emit(&Instruction::SetPinned { guid, pinned });
    }

    fn status(&self, text: &str) {
        self.emit(&Instruction::Status { text });
    }

    fn alert(&self, message: &str) {
        self.emit(&Instruction::Alert { message });
    }

    async fn confirm(&self, message: &str) -> bool {
        let (tx, rx) = oneshot::channel();
        *self.pending_confirm.lock().unwrap() = Some(tx);
        self.emit(&Instruction::Confirm { message });
        rx.await.unwrap_or(false)
    }

    fn close(&self) {
        self.emit(&Instruction::Close);
        self.closed.notify_one();
    }
}
