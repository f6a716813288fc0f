//! Plain-text rendering of a draw session.

use std::fmt::Write;

use bingo_draw::{DrawOutcome, DrawSession, POOL_SIZE};

pub const TITLE: &str = "Lucky Bingo";
pub const DRAWING: &str = "Drawing number...";
pub const PLACEHOLDER: &str = "Your next number will appear here.";
pub const HELP: &str = "[Enter/d] draw   [r] reset   [s] show   [j] json   [q] quit";

/// Short line describing a draw that did not produce a number.
pub fn outcome_note(outcome: DrawOutcome) -> Option<&'static str> {
    match outcome {
        DrawOutcome::Drawn(_) | DrawOutcome::Exhausted => None,
        DrawOutcome::InFlight => Some("A draw is already in progress."),
        DrawOutcome::Stale => Some("Draw cancelled by reset."),
    }
}

fn ball(value: u8) -> String {
    format!("( {:>2} )", value)
}

/// Render the full screen for a session.
pub fn render<R>(session: &DrawSession<R>, history_len: usize, phrase: Option<&str>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== {} ===", TITLE);
    match session.current_number() {
        Some(value) if !session.is_drawing() => {
            let _ = writeln!(out, "{}", ball(value));
        }
        _ if session.is_drawing() => {
            let _ = writeln!(out, "{}", DRAWING);
        }
        _ => {
            let _ = writeln!(out, "{}", PLACEHOLDER);
        }
    }

    if let Some(message) = session.state().message() {
        let _ = writeln!(out, "! {}", message);
    }

    if let Some(phrase) = phrase {
        let _ = writeln!(out, "~ {}", phrase);
    }

    if !session.drawn().is_empty() {
        let recent: Vec<String> = session
            .recent(history_len)
            .iter()
            .map(|d| {
                if d.latest {
                    format!("[{}]", d.value)
                } else {
                    d.value.to_string()
                }
            })
            .collect();
        let _ = writeln!(out, "Latest: {}", recent.join(" "));

        let all: Vec<String> = session.drawn().iter().map(|v| v.to_string()).collect();
        let _ = writeln!(
            out,
            "All numbers ({}/{}): {}",
            session.drawn().len(),
            POOL_SIZE,
            all.join(" ")
        );
    }

    out
}
