//! Draw session state.
//!
//! - `pool` - fixed number range, drawn set, unique pick
//! - `history` - recent-draws view
//! - `session` - session state machine (draw/reset)
//! - `driver` - async wrapper that adds the reveal delay
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       DrawDriver                          │
//! │   begin_draw ──▶ sleep(reveal_delay) ──▶ complete_draw    │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │                   DrawSession                        │  │
//! │  │                                                      │  │
//! │  │  DrawnSet ◀── pick_unique(rng, drawn)                │  │
//! │  │  History  (draw order)  ──▶ recent_draws(k ≤ 10)     │  │
//! │  │  SessionState  Idle / Drawing / Result / Exhausted   │  │
//! │  │  epoch  (bumped by reset, stale tickets discarded)   │  │
//! │  │                                                      │  │
//! │  │  observers ──▶ on_draw_succeeded / on_reset          │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use bingo_draw::state::{DrawOutcome, DrawSession, SessionState};
//!
//! let mut session = DrawSession::with_seed(7);
//!
//! let value = session.draw().value().unwrap();
//! assert_eq!(*session.state(), SessionState::Result(value));
//! assert_eq!(session.history(), &[value]);
//!
//! session.reset();
//! assert_eq!(*session.state(), SessionState::Idle);
//! assert!(session.history().is_empty());
//! # let _ = DrawOutcome::Exhausted;
//! ```

pub mod driver;
pub mod history;
pub mod pool;
pub mod session;

// Re-export commonly used types
pub use driver::{DrawDriver, DEFAULT_REVEAL_DELAY};
pub use history::{recent_draws, RecentDraw, HISTORY_VIEW_MAX};
pub use pool::{in_range, pick_unique, DrawnSet, POOL_SIZE, RANGE_MAX, RANGE_MIN};
pub use session::{
    DrawOutcome, DrawSession, DrawStart, DrawTicket, SessionState, EXHAUSTED_MESSAGE,
};
