//! Tone cues for draw and reset.
//!
//! Each cue is a short oscillator sweep with a fast attack and an
//! exponential decay. [`AudioCues`] renders the tone when a transition
//! fires and hands the samples to a [`CueSink`]; playback failures are
//! logged and otherwise ignored.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::SessionObserver;

/// Default output sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Gain the decay ends on. Exponential ramps cannot reach zero.
const GAIN_FLOOR: f32 = 0.0001;

/// Which transition a cue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    Draw,
    Reset,
}

impl CueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Reset => "reset",
        }
    }

    pub fn tone(&self) -> ToneSpec {
        match self {
            Self::Draw => ToneSpec {
                waveform: Waveform::Sine,
                start_hz: 800.0,
                end_hz: 600.0,
                sweep: Duration::from_millis(100),
                attack: Duration::from_millis(10),
                duration: Duration::from_millis(200),
                peak_gain: 0.4,
            },
            Self::Reset => ToneSpec {
                waveform: Waveform::Triangle,
                start_hz: 400.0,
                end_hz: 200.0,
                sweep: Duration::from_millis(200),
                attack: Duration::from_millis(10),
                duration: Duration::from_millis(300),
                peak_gain: 0.4,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

impl Waveform {
    /// Sample the waveform at `phase` cycles.
    fn sample(&self, phase: f32) -> f32 {
        match self {
            Self::Sine => (TAU * phase).sin(),
            Self::Triangle => 1.0 - 4.0 * (phase.fract() - 0.5).abs(),
        }
    }
}

/// Parameters of a single tone.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSpec {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    /// Time for the frequency to glide from start to end
    pub sweep: Duration,
    /// Linear ramp from silence to peak gain
    pub attack: Duration,
    /// Total length, including attack and decay
    pub duration: Duration,
    pub peak_gain: f32,
}

impl ToneSpec {
    /// Number of samples at the given rate.
    pub fn sample_count(&self, sample_rate: u32) -> usize {
        (self.duration.as_secs_f32() * sample_rate as f32).round() as usize
    }

    /// Frequency at time `t` seconds. Exponential glide, then held.
    pub fn frequency_at(&self, t: f32) -> f32 {
        let sweep = self.sweep.as_secs_f32();
        if sweep <= 0.0 || t >= sweep {
            return self.end_hz;
        }
        self.start_hz * (self.end_hz / self.start_hz).powf(t / sweep)
    }

    /// Gain at time `t` seconds.
    pub fn gain_at(&self, t: f32) -> f32 {
        let attack = self.attack.as_secs_f32();
        let total = self.duration.as_secs_f32();
        if t < attack {
            return self.peak_gain * t / attack;
        }
        if t >= total {
            return 0.0;
        }
        let decay = (total - attack).max(f32::EPSILON);
        self.peak_gain * (GAIN_FLOOR / self.peak_gain).powf((t - attack) / decay)
    }

    /// Synthesize mono samples.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f32;
        let mut phase = 0.0f32;

        (0..self.sample_count(sample_rate))
            .map(|i| {
                let t = i as f32 / rate;
                let sample = self.waveform.sample(phase) * self.gain_at(t);
                phase = (phase + self.frequency_at(t) / rate).fract();
                sample
            })
            .collect()
    }
}

/// Audio playback errors.
#[derive(Debug, Error)]
pub enum CueError {
    #[error("audio output not supported: {0}")]
    Unsupported(String),
    #[error("audio sink failed: {0}")]
    Sink(String),
}

/// Destination for rendered cues.
pub trait CueSink: Send + Sync {
    fn play(&self, kind: CueKind, samples: Vec<f32>, sample_rate: u32) -> Result<(), CueError>;
}

/// Sink that only logs the cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCueSink;

impl CueSink for TracingCueSink {
    fn play(&self, kind: CueKind, samples: Vec<f32>, sample_rate: u32) -> Result<(), CueError> {
        tracing::debug!(
            cue = kind.as_str(),
            samples = samples.len(),
            sample_rate,
            "audio cue"
        );
        Ok(())
    }
}

/// Observer that plays a cue on every draw and reset.
pub struct AudioCues {
    sink: Arc<dyn CueSink>,
    sample_rate: u32,
}

impl AudioCues {
    pub fn new(sink: Arc<dyn CueSink>) -> Self {
        Self::with_sample_rate(sink, DEFAULT_SAMPLE_RATE)
    }

    pub fn with_sample_rate(sink: Arc<dyn CueSink>, sample_rate: u32) -> Self {
        Self { sink, sample_rate }
    }

    fn play(&self, kind: CueKind) {
        let samples = kind.tone().render(self.sample_rate);
        if let Err(e) = self.sink.play(kind, samples, self.sample_rate) {
            tracing::warn!(cue = kind.as_str(), error = %e, "audio cue dropped");
        }
    }
}

impl SessionObserver for AudioCues {
    fn on_draw_succeeded(&self, _value: u8, _history: &[u8]) {
        self.play(CueKind::Draw);
    }

    fn on_reset(&self) {
        self.play(CueKind::Reset);
    }
}
