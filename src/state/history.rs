//! Recent-draws view over the session history.

/// Maximum number of entries a history view will return.
pub const HISTORY_VIEW_MAX: usize = 10;

/// One entry of the recent-draws view.
///
/// Entries are identified by their position in the full history, not by
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentDraw {
    /// Index into the session history (0 = first draw of the session)
    pub position: usize,
    pub value: u8,
    /// Whether this is the most recent draw
    pub latest: bool,
}

impl RecentDraw {
    /// Stable key for rendering.
    pub fn key(&self) -> String {
        format!("{}-{}", self.value, self.position)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "position": self.position,
            "value": self.value,
            "latest": self.latest
        })
    }
}

/// The last `limit` draws, most recent first.
///
/// `limit` is clamped to [`HISTORY_VIEW_MAX`].
pub fn recent_draws(history: &[u8], limit: usize) -> Vec<RecentDraw> {
    let limit = limit.min(HISTORY_VIEW_MAX);
    let start = history.len().saturating_sub(limit);

    history[start..]
        .iter()
        .enumerate()
        .rev()
        .map(|(offset, &value)| RecentDraw {
            position: start + offset,
            value,
            latest: start + offset + 1 == history.len(),
        })
        .collect()
}
