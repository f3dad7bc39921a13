//! Optimistic mutations: the view changes immediately, the store is told
//! afterwards, and a refusal rolls the view back.

use anyhow::Result;
use tracing::warn;

use crate::view::{Manager, PINNED_CONFIRM};

impl Manager {
    /// Flip a record's pinned flag in the view, then persist via `add`.
    /// If the store refuses, the flag is flipped back and the store's
    /// reason is surfaced as an alert. Toggles are serialized per manager:
    /// an overlapping toggle waits for the in-flight one to settle, so the
    /// pre-flip value being restored is never another toggle's optimism.
    pub async fn toggle_pinned(&self, guid: &str) -> Result<()> {
        let _gate = self.pin_gate.lock().await;
        let updated = {
            let mut st = self.state.lock().unwrap();
            let Some(row) = st.rows.iter_mut().find(|r| r.guid == guid) else {
                return Ok(());
            };
            row.pinned = !row.pinned;
            row.clone()
        };
        self.surface.set_pinned(guid, updated.pinned);

        if let Err(e) = self.store.add(updated.clone()).await {
            warn!("pin update failed for {guid}: {e}");
            {
                let mut st = self.state.lock().unwrap();
                if let Some(row) = st.rows.iter_mut().find(|r| r.guid == guid) {
                    row.pinned = !updated.pinned;
                }
            }
            self.surface.set_pinned(guid, !updated.pinned);
            self.surface.alert(&e.to_string());
        }
        Ok(())
    }

    /// Remove a record. Pinned records require confirmation first, and the
    /// row only leaves the view once the store has accepted the removal.
    pub async fn remove(&self, guid: &str) -> Result<()> {
        let pinned = {
            let st = self.state.lock().unwrap();
            match st.rows.iter().find(|r| r.guid == guid) {
                Some(row) => row.pinned,
                None => return Ok(()),
            }
        };
        if pinned && !self.surface.confirm(PINNED_CONFIRM).await {
            return Ok(());
        }
        match self.store.remove(guid).await {
            Ok(()) => {
                let mut st = self.state.lock().unwrap();
                st.rows.retain(|r| r.guid != guid);
                drop(st);
                self.surface.remove_row(guid);
            }
            Err(e) => {
                warn!("remove failed for {guid}: {e}");
                self.surface.alert(&e.to_string());
            }
        }
        Ok(())
    }
}
