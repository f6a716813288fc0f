//! Async draw orchestration.
//!
//! Wraps a [`DrawSession`] and puts the reveal delay between starting a draw
//! and picking the number. The session lock is never held across the delay,
//! so a reset can land while a draw is pending; that draw then resolves as
//! [`DrawOutcome::Stale`].
//!
//! The delay and the reveal run in their own task. Dropping the future
//! returned by [`DrawDriver::draw`] does not cancel the reveal, so the
//! session always leaves `Drawing`.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::Mutex;

use super::session::{DrawOutcome, DrawSession, DrawStart};

/// Default pause before a drawn number is revealed.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(500);

/// Shared handle to a session with a reveal delay.
#[derive(Debug)]
pub struct DrawDriver<R = StdRng> {
    session: Arc<Mutex<DrawSession<R>>>,
    reveal_delay: Duration,
}

impl<R> Clone for DrawDriver<R> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            reveal_delay: self.reveal_delay,
        }
    }
}

impl<R: Rng + Send + 'static> DrawDriver<R> {
    pub fn new(session: DrawSession<R>) -> Self {
        Self::with_delay(session, DEFAULT_REVEAL_DELAY)
    }

    pub fn with_delay(session: DrawSession<R>, reveal_delay: Duration) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            reveal_delay,
        }
    }

    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }

    /// Draw a number after the reveal delay.
    pub async fn draw(&self) -> DrawOutcome {
        let ticket = match self.session.lock().await.begin_draw() {
            DrawStart::Started(ticket) => ticket,
            DrawStart::Exhausted => return DrawOutcome::Exhausted,
            DrawStart::InFlight => return DrawOutcome::InFlight,
        };

        let session = Arc::clone(&self.session);
        let delay = self.reveal_delay;
        let reveal = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.lock().await.complete_draw(ticket)
        });

        match reveal.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "reveal task failed");
                DrawOutcome::Stale
            }
        }
    }

    /// Reset the session, cancelling any pending draw.
    pub async fn reset(&self) {
        self.session.lock().await.reset();
    }

    /// Run a closure against the session.
    pub async fn with_session<T>(&self, f: impl FnOnce(&DrawSession<R>) -> T) -> T {
        let session = self.session.lock().await;
        f(&session)
    }

    /// JSON snapshot of the session.
    pub async fn snapshot(&self) -> serde_json::Value {
        self.with_session(|s| s.to_json()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::SessionState;

    async fn wait_until_drawing(driver: &DrawDriver) {
        while !driver.with_session(|s| s.is_drawing()).await {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_draw_after_delay() {
        let driver = DrawDriver::new(DrawSession::with_seed(1));
        let started = tokio::time::Instant::now();

        let outcome = driver.draw().await;

        assert!(outcome.is_drawn());
        assert!(started.elapsed() >= DEFAULT_REVEAL_DELAY);
        let history = driver.with_session(|s| s.history().to_vec()).await;
        assert_eq!(history, vec![outcome.value().unwrap()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_draw_rejected() {
        let driver = DrawDriver::new(DrawSession::with_seed(2));

        let pending = tokio::spawn({
            let driver = driver.clone();
            async move { driver.draw().await }
        });
        wait_until_drawing(&driver).await;

        assert_eq!(driver.draw().await, DrawOutcome::InFlight);
        assert!(pending.await.unwrap().is_drawn());
        assert_eq!(driver.with_session(|s| s.history().len()).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_delay_discards_draw() {
        let driver = DrawDriver::new(DrawSession::with_seed(3));

        let pending = tokio::spawn({
            let driver = driver.clone();
            async move { driver.draw().await }
        });
        wait_until_drawing(&driver).await;

        driver.reset().await;

        assert_eq!(pending.await.unwrap(), DrawOutcome::Stale);
        let (state, history, current) = driver
            .with_session(|s| (s.state().clone(), s.history().to_vec(), s.current_number()))
            .await;
        assert_eq!(state, SessionState::Idle);
        assert!(history.is_empty());
        assert_eq!(current, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_draw_still_reveals() {
        let driver = DrawDriver::new(DrawSession::with_seed(5));

        let timed_out = tokio::time::timeout(Duration::from_millis(100), driver.draw()).await;
        assert!(timed_out.is_err());
        assert!(driver.with_session(|s| s.is_drawing()).await);

        tokio::time::sleep(Duration::from_secs(5)).await;

        let (state, drawn) = driver
            .with_session(|s| (s.state().clone(), s.history().len()))
            .await;
        assert!(matches!(state, SessionState::Result(_)));
        assert_eq!(drawn, 1);

        assert!(driver.draw().await.is_drawn());
        assert_eq!(driver.with_session(|s| s.history().len()).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot() {
        let driver = DrawDriver::with_delay(DrawSession::with_seed(4), Duration::from_millis(10));
        driver.draw().await;

        let json = driver.snapshot().await;
        assert_eq!(json["drawn_count"], 1);
        assert_eq!(json["state"], "result");
    }
}
