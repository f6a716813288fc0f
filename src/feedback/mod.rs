//! Feedback hooks driven by session transitions.
//!
//! The session calls every registered [`SessionObserver`] after a successful
//! draw and after a reset. Observers run on the caller's thread while the
//! session is borrowed, so they must only enqueue or spawn work.
//!
//! - `audio` - tone cues for draw/reset
//! - `phrase` - decorative phrase enrichment from an external text service

pub mod audio;
pub mod phrase;

pub use audio::{AudioCues, CueError, CueKind, CueSink, ToneSpec, TracingCueSink, Waveform};
pub use phrase::{GeminiPhraseSource, PhraseEnricher, PhraseError, PhraseSource};

/// Receives session transition notifications.
///
/// Both methods default to no-ops.
pub trait SessionObserver: Send + Sync {
    /// A number was drawn. `history` includes it as the last entry.
    fn on_draw_succeeded(&self, value: u8, history: &[u8]) {
        let _ = (value, history);
    }

    /// The session was reset.
    fn on_reset(&self) {}
}
