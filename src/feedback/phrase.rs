//! Lucky-phrase enrichment.
//!
//! After each draw the [`PhraseEnricher`] asks a [`PhraseSource`] for a short
//! phrase inspired by the drawn numbers. The request runs as a detached
//! tokio task; failures are logged and the session never waits on it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::SessionObserver;

/// Model used when none is configured.
pub const DEFAULT_PHRASE_MODEL: &str = "gemini-2.5-flash";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Phrase enrichment errors.
#[derive(Debug, Error)]
pub enum PhraseError {
    #[error("API key not set (tried {})", API_KEY_VARS.join(", "))]
    MissingApiKey,
    #[error("could not generate a lucky phrase: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for PhraseError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// Produces a phrase for a list of drawn numbers.
#[async_trait]
pub trait PhraseSource: Send + Sync {
    async fn phrase(&self, numbers: &[u8]) -> Result<String, PhraseError>;
}

/// Build the text prompt for a list of numbers.
pub fn prompt_for(numbers: &[u8]) -> String {
    let list = numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Numbers drawn: {}. Write a short, creative and optimistic phrase of at most \
         15 words about luck, the future or prosperity, inspired by these numbers. \
         Be poetic and inspiring.",
        list
    )
}

/// Strip markdown emphasis and surrounding whitespace from a reply.
pub fn clean_phrase(text: &str) -> String {
    text.trim().replace('*', "")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Phrase source backed by the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiPhraseSource {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiPhraseSource {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Read the API key from the environment.
    pub fn from_env(model: String) -> Result<Self, PhraseError> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .ok_or(PhraseError::MissingApiKey)?;
        Ok(Self::new(api_key, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PhraseSource for GeminiPhraseSource {
    async fn phrase(&self, numbers: &[u8]) -> Result<String, PhraseError> {
        let prompt = prompt_for(numbers);
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.8,
                top_p: 0.9,
            },
        };

        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let response: GenerateResponse = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .text()
            .map(|text| clean_phrase(&text))
            .ok_or_else(|| PhraseError::Unavailable("empty response".to_string()))
    }
}

/// Observer that fetches a phrase after every draw.
///
/// Keeps only the phrase for the newest draw. A reply for an older draw
/// never replaces a newer one. A reset clears the phrase, and replies that
/// arrive after a reset are dropped.
pub struct PhraseEnricher {
    source: Arc<dyn PhraseSource>,
    latest: Arc<Mutex<Option<LuckyPhrase>>>,
    epoch: Arc<AtomicU64>,
}

/// A phrase and the draw it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LuckyPhrase {
    /// History length at the time of the request
    drawn: usize,
    text: String,
}

impl PhraseEnricher {
    pub fn new(source: Arc<dyn PhraseSource>) -> Self {
        Self {
            source,
            latest: Arc::new(Mutex::new(None)),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Most recent phrase, if one has arrived since the last reset.
    pub fn latest(&self) -> Option<String> {
        lock(&self.latest).as_ref().map(|p| p.text.clone())
    }

    /// Phrase for the draw that brought the history to `drawn` entries.
    pub fn latest_for(&self, drawn: usize) -> Option<String> {
        lock(&self.latest)
            .as_ref()
            .filter(|p| p.drawn == drawn)
            .map(|p| p.text.clone())
    }
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionObserver for PhraseEnricher {
    fn on_draw_succeeded(&self, value: u8, history: &[u8]) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(value, "no async runtime, skipping phrase");
            return;
        };

        let source = Arc::clone(&self.source);
        let latest = Arc::clone(&self.latest);
        let epoch = Arc::clone(&self.epoch);
        let requested_in = epoch.load(Ordering::SeqCst);
        let numbers = history.to_vec();
        let drawn = numbers.len();

        tracing::debug!(value, drawn, "requesting phrase");

        handle.spawn(async move {
            let text = match source.phrase(&numbers).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(value, error = %e, "phrase unavailable");
                    return;
                }
            };

            if epoch.load(Ordering::SeqCst) != requested_in {
                tracing::debug!(value, "dropping phrase from before reset");
                return;
            }

            let mut slot = lock(&latest);
            if slot.as_ref().is_some_and(|p| p.drawn > drawn) {
                tracing::debug!(value, drawn, "dropping phrase for an older draw");
                return;
            }
            tracing::info!(value, phrase = %text, "lucky phrase");
            *slot = Some(LuckyPhrase { drawn, text });
        });
    }

    fn on_reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *lock(&self.latest) = None;
    }
}
