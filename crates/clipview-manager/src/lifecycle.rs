//! Exit semantics: focus handoff to the previously active process, then
//! close. The persistent store connection (see `remote`) stays open for the
//! whole `Active` phase; dropping it on close is what lets a second
//! instance take over.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::focus::FocusChannel;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active,
    Exiting,
}

pub struct Lifecycle {
    surface: Arc<dyn Surface>,
    focus: Arc<dyn FocusChannel>,
    target_pid: i32,
    return_focus: bool,
    phase: Mutex<Phase>,
}

impl Lifecycle {
    pub fn new(
        surface: Arc<dyn Surface>,
        focus: Arc<dyn FocusChannel>,
        target_pid: i32,
        return_focus: bool,
    ) -> Self {
        Self {
            surface,
            focus,
            target_pid,
            return_focus,
            phase: Mutex::new(Phase::Active),
        }
    }

    pub fn is_exiting(&self) -> bool {
        *self.phase.lock().unwrap() == Phase::Exiting
    }

    /// Transition to `Exiting` (terminal, idempotent). Hands focus back to
    /// the target process first when one is known and the preference allows
    /// it; a failed handoff is logged but never blocks the close. Only
    /// positive pids count as known; 0 and the -1 sentinel both mean none.
    pub async fn exit(&self) {
        {
            let mut phase = self.phase.lock().unwrap();
            if *phase == Phase::Exiting {
                return;
            }
            *phase = Phase::Exiting;
        }
        if self.target_pid > 0 && self.return_focus {
            debug!(pid = self.target_pid, "handing focus back");
            if let Err(e) = self.focus.restore(self.target_pid).await {
                warn!("focus handoff failed: {e}");
            }
        }
        self.surface.close();
    }
}
