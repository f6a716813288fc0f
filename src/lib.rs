//! Bingo Draw Library
//!
//! This crate provides the draw session for a 1-90 bingo caller.
//!
//! # Overview
//!
//! - **Draw Session** - Draws numbers without repetition, keeps the drawn
//!   set and the draw history, and reports exhaustion once all 90 numbers
//!   are out.
//!
//! - **Draw Driver** - Async wrapper that adds a reveal delay and discards
//!   draws that resolve after a reset.
//!
//! - **Feedback** - Observers for tone cues and lucky-phrase enrichment.
//!   They never block or change the session.
//!
//! - **Config** - Reveal delay, history length, seed and phrase settings.
//!
//! # Design Principles
//!
//! 1. **Exhaustion is a state, not an error** - drawing from an empty pool
//!    returns `DrawOutcome::Exhausted` and leaves everything as it was.
//!
//! 2. **Reset always wins** - a draw started before a reset never lands in
//!    the new session.
//!
//! 3. **Observers are injected** - the session works with none attached.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bingo_draw::{
//!     feedback::{AudioCues, TracingCueSink},
//!     DrawOutcome, DrawSession, POOL_SIZE,
//! };
//!
//! let mut session = DrawSession::with_seed(1)
//!     .with_observer(Arc::new(AudioCues::new(Arc::new(TracingCueSink))));
//!
//! for _ in 0..POOL_SIZE {
//!     assert!(session.draw().is_drawn());
//! }
//! assert_eq!(session.draw(), DrawOutcome::Exhausted);
//!
//! session.reset();
//! assert!(session.history().is_empty());
//! ```

pub mod config;
pub mod feedback;
pub mod state;

pub use config::{ConfigError, DrawConfig};
// Re-export everything from state module at crate root
pub use state::*;
