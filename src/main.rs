//! Terminal bingo caller.

mod display;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use bingo_draw::feedback::{AudioCues, GeminiPhraseSource, PhraseEnricher, TracingCueSink};
use bingo_draw::{DrawConfig, DrawDriver, DrawOutcome, DrawSession};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinHandle};
use tracing_subscriber::EnvFilter;

/// Draw bingo numbers from 1 to 90.
#[derive(Debug, Parser)]
#[command(name = "bingo", version, about)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reveal delay in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Fixed seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Fetch a lucky phrase after each draw (needs GEMINI_API_KEY or API_KEY)
    #[arg(long)]
    phrases: bool,
}

impl Cli {
    fn resolve(&self) -> Result<DrawConfig, bingo_draw::ConfigError> {
        let mut config = match &self.config {
            Some(path) => DrawConfig::load(path)?,
            None => DrawConfig::default(),
        };
        if let Some(delay_ms) = self.delay_ms {
            config.reveal_delay_ms = delay_ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.phrases |= self.phrases;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Draw,
    Reset,
    Show,
    Json,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "d" | "draw" => Some(Self::Draw),
            "r" | "reset" => Some(Self::Reset),
            "s" | "show" => Some(Self::Show),
            "j" | "json" => Some(Self::Json),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }

    /// Whether the command may run while a draw is still being revealed.
    fn runs_while_drawing(self) -> bool {
        self != Self::Draw
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bingo_draw=info,bingo=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve()?;
    tracing::debug!(?config, "starting");

    let mut session = match config.seed {
        Some(seed) => DrawSession::with_seed(seed),
        None => DrawSession::new(),
    };
    session.add_observer(Arc::new(AudioCues::new(Arc::new(TracingCueSink))));

    let enricher = if config.phrases {
        match GeminiPhraseSource::from_env(config.phrase_model.clone()) {
            Ok(source) => {
                let enricher = Arc::new(PhraseEnricher::new(Arc::new(source)));
                session.add_observer(enricher.clone());
                Some(enricher)
            }
            Err(e) => {
                tracing::warn!(error = %e, "phrases disabled");
                None
            }
        }
    } else {
        None
    };

    let driver = DrawDriver::with_delay(session, config.reveal_delay());
    let enricher = enricher.as_deref();

    println!("{}", display::HELP);
    show(&driver, enricher, config.history_len).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<JoinHandle<DrawOutcome>> = None;
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match Command::parse(&line) {
                    None => println!("{}", display::HELP),
                    Some(command) if pending.is_some() && !command.runs_while_drawing() => {
                        if let Some(note) = display::outcome_note(DrawOutcome::InFlight) {
                            println!("{}", note);
                        }
                    }
                    Some(Command::Draw) => {
                        println!("{}", display::DRAWING);
                        let driver = driver.clone();
                        pending = Some(tokio::spawn(async move { driver.draw().await }));
                    }
                    Some(Command::Reset) => {
                        driver.reset().await;
                        show(&driver, enricher, config.history_len).await;
                    }
                    Some(Command::Show) => show(&driver, enricher, config.history_len).await,
                    Some(Command::Json) => {
                        println!("{}", serde_json::to_string_pretty(&driver.snapshot().await)?);
                    }
                    Some(Command::Quit) => break,
                }
                prompt();
            }
            joined = reveal(&mut pending), if pending.is_some() => {
                pending = None;
                match joined {
                    Ok(outcome) => {
                        if let Some(note) = display::outcome_note(outcome) {
                            println!("{}", note);
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "draw task failed"),
                }
                show(&driver, enricher, config.history_len).await;
                prompt();
            }
        }
    }

    Ok(())
}

/// Wait for the pending draw, or forever if there is none.
async fn reveal(pending: &mut Option<JoinHandle<DrawOutcome>>) -> Result<DrawOutcome, JoinError> {
    match pending {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

/// Print the session screen with the phrase for the current draw, if any.
async fn show(driver: &DrawDriver, enricher: Option<&PhraseEnricher>, history_len: usize) {
    let screen = driver
        .with_session(|s| {
            let phrase = enricher.and_then(|e| e.latest_for(s.history().len()));
            display::render(s, history_len, phrase.as_deref())
        })
        .await;
    println!("{}", screen);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse(""), Some(Command::Draw));
        assert_eq!(Command::parse(" D \n"), Some(Command::Draw));
        assert_eq!(Command::parse("reset"), Some(Command::Reset));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("spin"), None);
    }

    #[test]
    fn test_reset_and_quit_run_while_drawing() {
        assert!(!Command::Draw.runs_while_drawing());
        assert!(Command::Reset.runs_while_drawing());
        assert!(Command::Quit.runs_while_drawing());
        assert!(Command::Show.runs_while_drawing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_while_reveal_pending() {
        let driver = DrawDriver::new(DrawSession::with_seed(8));
        let mut pending = Some(tokio::spawn({
            let driver = driver.clone();
            async move { driver.draw().await }
        }));
        while !driver.with_session(|s| s.is_drawing()).await {
            tokio::task::yield_now().await;
        }

        driver.reset().await;

        assert_eq!(reveal(&mut pending).await.unwrap(), DrawOutcome::Stale);
        assert_eq!(driver.with_session(|s| s.history().len()).await, 0);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["bingo", "--delay-ms", "0", "--seed", "9"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.reveal_delay_ms, 0);
        assert_eq!(config.seed, Some(9));
        assert!(!config.phrases);
    }
}
