//! Draw session state machine.
//!
//! Owns the drawn set, the history, and the lifecycle state, and guarantees
//! that no number is drawn twice between resets.
//!
//! # State Diagram
//!
//! ```text
//!              reset (from any state)
//!   ┌────────────────────────────────────────────┐
//!   ▼                                            │
//! ┌──────┐  draw   ┌─────────┐  picked   ┌──────────────┐
//! │ Idle │────────▶│ Drawing │──────────▶│ Result(value)│
//! └──────┘         └────┬────┘◀──────────└──────────────┘
//!                       │ pool empty         draw
//!                       ▼
//!                 ┌──────────────┐
//!                 │  Exhausted   │ (draw is a no-op until reset)
//!                 └──────────────┘
//! ```
//!
//! A draw may be split into [`DrawSession::begin_draw`] and
//! [`DrawSession::complete_draw`] so a caller can put a delay in between.
//! Every reset bumps the session epoch; a completion whose ticket carries an
//! older epoch is discarded as stale.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::history::{recent_draws, RecentDraw};
use super::pool::{pick_unique, DrawnSet};
use crate::feedback::SessionObserver;

/// Message shown once every number has been drawn.
pub const EXHAUSTED_MESSAGE: &str = "Bingo! All numbers from 1 to 90 have already been drawn.";

/// Lifecycle state of a draw session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Fresh or just reset
    #[default]
    Idle,
    /// A draw has started and not yet resolved
    Drawing,
    /// Last draw produced this value
    Result(u8),
    /// Pool is empty; only reset leaves this state
    Exhausted(String),
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Drawing => "drawing",
            Self::Result(_) => "result",
            Self::Exhausted(_) => "exhausted",
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    /// User-facing message, if the state carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Exhausted(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Drawing => write!(f, "Drawing"),
            Self::Result(value) => write!(f, "Result({})", value),
            Self::Exhausted(message) => write!(f, "Exhausted({})", message),
        }
    }
}

/// Result of a draw request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// A new number was drawn
    Drawn(u8),
    /// Every number has been drawn; nothing changed
    Exhausted,
    /// Another draw is already in flight; nothing changed
    InFlight,
    /// A reset happened before this draw resolved; result discarded
    Stale,
}

impl DrawOutcome {
    pub fn value(&self) -> Option<u8> {
        match self {
            Self::Drawn(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn(_))
    }
}

/// Proof that a draw was started in a particular epoch.
#[derive(Debug, PartialEq, Eq)]
pub struct DrawTicket {
    epoch: u64,
}

impl DrawTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Result of starting a draw.
#[derive(Debug, PartialEq, Eq)]
pub enum DrawStart {
    Started(DrawTicket),
    Exhausted,
    InFlight,
}

/// A single bingo draw session.
pub struct DrawSession<R = StdRng> {
    rng: R,

    /// Current lifecycle state
    state: SessionState,

    /// Every number drawn so far
    drawn: DrawnSet,

    /// Draw order, oldest first
    history: Vec<u8>,

    /// Most recent successful draw
    current: Option<u8>,

    /// Bumped on every reset
    epoch: u64,

    observers: Vec<Arc<dyn SessionObserver>>,

    /// When the session was created or last reset
    pub started_at: DateTime<Utc>,

    /// When the last successful draw happened
    pub last_drawn_at: Option<DateTime<Utc>>,
}

impl DrawSession<StdRng> {
    /// Create a session seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a session with a reproducible draw sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for DrawSession<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> DrawSession<R> {
    /// Create a session drawing from the given generator.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            state: SessionState::Idle,
            drawn: DrawnSet::new(),
            history: Vec::new(),
            current: None,
            epoch: 0,
            observers: Vec::new(),
            started_at: Utc::now(),
            last_drawn_at: None,
        }
    }

    /// Register a transition observer.
    pub fn add_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Builder-style [`add_observer`](Self::add_observer).
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    /// Draw a number immediately.
    pub fn draw(&mut self) -> DrawOutcome {
        match self.begin_draw() {
            DrawStart::Started(ticket) => self.complete_draw(ticket),
            DrawStart::Exhausted => DrawOutcome::Exhausted,
            DrawStart::InFlight => DrawOutcome::InFlight,
        }
    }

    /// Start a draw without picking the number yet.
    ///
    /// Checks exhaustion before any randomness is used. Rejects the call if
    /// another draw has not resolved.
    pub fn begin_draw(&mut self) -> DrawStart {
        if self.state.is_drawing() {
            tracing::debug!(epoch = self.epoch, "draw rejected, already drawing");
            return DrawStart::InFlight;
        }

        if self.drawn.is_exhausted() {
            tracing::debug!(drawn = self.drawn.len(), "pool exhausted");
            self.state = SessionState::Exhausted(EXHAUSTED_MESSAGE.to_string());
            return DrawStart::Exhausted;
        }

        self.state = SessionState::Drawing;
        tracing::debug!(epoch = self.epoch, "draw started");
        DrawStart::Started(DrawTicket { epoch: self.epoch })
    }

    /// Resolve a draw started with [`begin_draw`](Self::begin_draw).
    ///
    /// Returns [`DrawOutcome::Stale`] without touching state if the session
    /// was reset after the ticket was issued.
    pub fn complete_draw(&mut self, ticket: DrawTicket) -> DrawOutcome {
        if ticket.epoch != self.epoch || !self.state.is_drawing() {
            tracing::debug!(
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "discarding stale draw"
            );
            return DrawOutcome::Stale;
        }

        let Some(value) = pick_unique(&mut self.rng, &self.drawn) else {
            self.state = SessionState::Exhausted(EXHAUSTED_MESSAGE.to_string());
            return DrawOutcome::Exhausted;
        };

        self.drawn.insert(value);
        self.history.push(value);
        self.current = Some(value);
        self.state = SessionState::Result(value);
        self.last_drawn_at = Some(Utc::now());

        tracing::info!(value, drawn = self.drawn.len(), "number drawn");

        for observer in &self.observers {
            observer.on_draw_succeeded(value, &self.history);
        }

        DrawOutcome::Drawn(value)
    }

    /// Clear everything and return to idle.
    ///
    /// Any draw still in flight will resolve as stale.
    pub fn reset(&mut self) {
        self.drawn.clear();
        self.history.clear();
        self.current = None;
        self.state = SessionState::Idle;
        self.epoch += 1;
        self.started_at = Utc::now();
        self.last_drawn_at = None;

        tracing::info!(epoch = self.epoch, "session reset");

        for observer in &self.observers {
            observer.on_reset();
        }
    }
}

impl<R> DrawSession<R> {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_number(&self) -> Option<u8> {
        self.current
    }

    pub fn drawn(&self) -> &DrawnSet {
        &self.drawn
    }

    /// Draw order, oldest first.
    pub fn history(&self) -> &[u8] {
        &self.history
    }

    /// The last `limit` draws, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<RecentDraw> {
        recent_draws(&self.history, limit)
    }

    pub fn remaining(&self) -> usize {
        self.drawn.remaining()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_drawing(&self) -> bool {
        self.state.is_drawing()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.is_exhausted()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Convert session state to JSON snapshot.
    pub fn to_json(&self) -> serde_json::Value {
        let recent: Vec<serde_json::Value> = self
            .recent(super::history::HISTORY_VIEW_MAX)
            .iter()
            .map(|d| d.to_json())
            .collect();

        serde_json::json!({
            "state": self.state.as_str(),
            "message": self.state.message(),
            "current_number": self.current,
            "drawn": self.drawn.to_vec(),
            "drawn_count": self.drawn.len(),
            "remaining": self.drawn.remaining(),
            "history": self.history,
            "recent": recent,
            "started_at": self.started_at.to_rfc3339(),
            "last_drawn_at": self.last_drawn_at.map(|t| t.to_rfc3339())
        })
    }
}

impl<R> fmt::Debug for DrawSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawSession")
            .field("state", &self.state)
            .field("drawn", &self.drawn)
            .field("history", &self.history)
            .field("current", &self.current)
            .field("epoch", &self.epoch)
            .field("observers", &self.observers.len())
            .field("started_at", &self.started_at)
            .field("last_drawn_at", &self.last_drawn_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::pool::POOL_SIZE;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SessionObserver for Recorder {
        fn on_draw_succeeded(&self, value: u8, history: &[u8]) {
            assert_eq!(history.last(), Some(&value));
            self.events.lock().unwrap().push(format!("draw:{}", value));
        }

        fn on_reset(&self) {
            self.events.lock().unwrap().push("reset".to_string());
        }
    }

    fn drain_all(session: &mut DrawSession) -> Vec<u8> {
        (0..POOL_SIZE)
            .map(|_| session.draw().value().unwrap())
            .collect()
    }

    #[test]
    fn test_session_new() {
        let session = DrawSession::with_seed(1);
        assert_eq!(*session.state(), SessionState::Idle);
        assert_eq!(session.current_number(), None);
        assert!(session.drawn().is_empty());
        assert!(session.history().is_empty());
        assert_eq!(session.remaining(), 90);
    }

    #[test]
    fn test_single_draw() {
        let mut session = DrawSession::with_seed(1);

        let value = session.draw().value().unwrap();

        assert!((1..=90).contains(&value));
        assert_eq!(*session.state(), SessionState::Result(value));
        assert_eq!(session.current_number(), Some(value));
        assert_eq!(session.history(), &[value]);
        assert_eq!(session.drawn().to_vec(), vec![value]);
        assert!(session.last_drawn_at.is_some());
    }

    #[test]
    fn test_full_session_is_permutation() {
        let mut session = DrawSession::with_seed(42);

        let values = drain_all(&mut session);

        let unique: HashSet<u8> = values.iter().copied().collect();
        assert_eq!(unique.len(), 90);
        assert!(values.iter().all(|v| (1..=90).contains(v)));
        assert_eq!(session.history(), values.as_slice());

        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(session.drawn().to_vec(), sorted);
    }

    #[test]
    fn test_exhaustion_is_idempotent() {
        let mut session = DrawSession::with_seed(3);
        let values = drain_all(&mut session);
        let last = *values.last().unwrap();

        for _ in 0..3 {
            assert_eq!(session.draw(), DrawOutcome::Exhausted);
            assert!(session.is_exhausted());
            assert_eq!(session.state().message(), Some(EXHAUSTED_MESSAGE));
            assert_eq!(session.history().len(), 90);
            assert_eq!(session.drawn().len(), 90);
        }
        assert_eq!(session.current_number(), Some(last));
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut session = DrawSession::with_seed(5);

        session.reset();
        assert_eq!(*session.state(), SessionState::Idle);

        session.draw();
        session.draw();
        session.reset();
        assert_eq!(*session.state(), SessionState::Idle);
        assert!(session.history().is_empty());
        assert!(session.drawn().is_empty());
        assert_eq!(session.current_number(), None);

        drain_all(&mut session);
        session.draw();
        assert!(session.is_exhausted());
        session.reset();
        assert_eq!(*session.state(), SessionState::Idle);
        assert!(session.draw().is_drawn());
    }

    #[test]
    fn test_second_begin_rejected() {
        let mut session = DrawSession::with_seed(8);

        let ticket = match session.begin_draw() {
            DrawStart::Started(ticket) => ticket,
            other => panic!("unexpected {:?}", other),
        };
        assert!(session.is_drawing());

        assert_eq!(session.begin_draw(), DrawStart::InFlight);
        assert_eq!(session.draw(), DrawOutcome::InFlight);
        assert!(session.history().is_empty());

        assert!(session.complete_draw(ticket).is_drawn());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_reset_during_draw_discards_result() {
        let mut session = DrawSession::with_seed(11);
        session.draw();

        let DrawStart::Started(ticket) = session.begin_draw() else {
            panic!("draw should start");
        };
        session.reset();

        assert_eq!(session.complete_draw(ticket), DrawOutcome::Stale);
        assert_eq!(*session.state(), SessionState::Idle);
        assert!(session.history().is_empty());
        assert!(session.drawn().is_empty());
        assert_eq!(session.current_number(), None);
    }

    #[test]
    fn test_stale_ticket_does_not_touch_new_draw() {
        let mut session = DrawSession::with_seed(12);

        let DrawStart::Started(old) = session.begin_draw() else {
            panic!("draw should start");
        };
        session.reset();
        let DrawStart::Started(new) = session.begin_draw() else {
            panic!("draw should start after reset");
        };

        assert_eq!(session.complete_draw(old), DrawOutcome::Stale);
        assert!(session.is_drawing());
        assert!(session.complete_draw(new).is_drawn());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_observers_notified() {
        let recorder = Arc::new(Recorder::default());
        let mut session = DrawSession::with_seed(21).with_observer(recorder.clone());

        let a = session.draw().value().unwrap();
        let b = session.draw().value().unwrap();

        let DrawStart::Started(ticket) = session.begin_draw() else {
            panic!("draw should start");
        };
        session.reset();
        session.complete_draw(ticket);

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![format!("draw:{}", a), format!("draw:{}", b), "reset".to_string()]
        );
    }

    #[test]
    fn test_no_notification_on_exhaustion() {
        let recorder = Arc::new(Recorder::default());
        let mut session = DrawSession::with_seed(2);
        drain_all(&mut session);
        session.add_observer(recorder.clone());

        session.draw();
        session.draw();

        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = DrawSession::with_seed(77);
        let mut b = DrawSession::with_seed(77);
        assert_eq!(drain_all(&mut a), drain_all(&mut b));
    }

    #[test]
    fn test_to_json() {
        let mut session = DrawSession::with_seed(4);
        let value = session.draw().value().unwrap();

        let json = session.to_json();
        assert_eq!(json["state"], "result");
        assert_eq!(json["current_number"], value);
        assert_eq!(json["drawn_count"], 1);
        assert_eq!(json["remaining"], 89);
        assert_eq!(json["recent"][0]["latest"], true);
        assert!(json["message"].is_null());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Result(7).to_string(), "Result(7)");
        assert_eq!(SessionState::Idle.as_str(), "idle");
    }
}
