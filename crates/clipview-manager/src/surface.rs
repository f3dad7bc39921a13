use async_trait::async_trait;
use clipview_core::Record;

/// Render instructions produced by the engine and consumed by the external
/// renderer. Everything is fire-and-forget except `confirm`, which resolves
/// with the user's answer.
#[async_trait]
pub trait Surface: Send + Sync {
    fn add_row(&self, record: &Record);
    /// Empty the list, leaving `message` as the placeholder text.
    fn clear(&self, message: &str);
    /// Move selection to the first row.
    fn select(&self);
    fn remove_row(&self, guid: &str);
    fn set_pinned(&self, guid: &str, pinned: bool);
    /// Inline status line (match counts, fetch errors).
    fn status(&self, text: &str);
    /// Blocking notice shown over the list.
    fn alert(&self, message: &str);
    /// Destructive-action prompt; `false` aborts the action.
    async fn confirm(&self, message: &str) -> bool;
    fn close(&self);
}
