#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Label value that selects the heart formation instead of text
pub const HEART_SENTINEL: &str = "__heart__";

/// Phrases shown before the heart, in order
pub const DEFAULT_PHRASES: [&str; 5] = ["Te amo", "mi niña", "preciosa", "gracias", "por existir"];

/// Time each phrase stays on screen
pub const DEFAULT_PHRASE_INTERVAL_MS: u32 = 2500;

/// Direction of the pointer force
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SceneMode {
    Attract,
    #[default]
    Repel,
}

impl SceneMode {
    /// Sign applied to the particle-minus-pointer axis.
    /// Positive pushes particles away from the pointer.
    pub fn direction(&self) -> f32 {
        match self {
            SceneMode::Repel => 1.0,
            SceneMode::Attract => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneMode::Attract => "attract",
            SceneMode::Repel => "repel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown scene mode '{}' (expected 'attract' or 'repel')", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownMode {}

impl FromStr for SceneMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attract" => Ok(SceneMode::Attract),
            "repel" => Ok(SceneMode::Repel),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// What the particles are currently forming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetLabel {
    Text(String),
    Heart,
}

impl TargetLabel {
    pub fn parse(label: &str) -> Self {
        if label == HEART_SENTINEL {
            TargetLabel::Heart
        } else {
            TargetLabel::Text(label.to_string())
        }
    }

    pub fn is_heart(&self) -> bool {
        matches!(self, TargetLabel::Heart)
    }

    pub fn as_str(&self) -> &str {
        match self {
            TargetLabel::Text(text) => text,
            TargetLabel::Heart => HEART_SENTINEL,
        }
    }
}

impl From<String> for TargetLabel {
    fn from(label: String) -> Self {
        if label == HEART_SENTINEL {
            TargetLabel::Heart
        } else {
            TargetLabel::Text(label)
        }
    }
}

impl From<TargetLabel> for String {
    fn from(label: TargetLabel) -> Self {
        match label {
            TargetLabel::Text(text) => text,
            TargetLabel::Heart => HEART_SENTINEL.to_string(),
        }
    }
}

/// Scripted list of phrases that ends in the heart.
///
/// Elapsed time is measured from the moment the scene starts. Each phrase
/// holds for `interval_ms`; once the list runs out the label stays on the
/// heart for good.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhraseSequence {
    pub phrases: Vec<String>,
    pub interval_ms: u32,
}

impl Default for PhraseSequence {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
            interval_ms: DEFAULT_PHRASE_INTERVAL_MS,
        }
    }
}

impl PhraseSequence {
    pub fn new(phrases: Vec<String>, interval_ms: u32) -> Self {
        Self {
            phrases,
            interval_ms,
        }
    }

    /// Index of the phrase active at `elapsed_ms`; equals `phrases.len()` once finished
    pub fn phase_at(&self, elapsed_ms: f64) -> usize {
        if self.interval_ms == 0 {
            return self.phrases.len();
        }
        let phase = (elapsed_ms.max(0.0) / self.interval_ms as f64) as usize;
        phase.min(self.phrases.len())
    }

    pub fn label_at(&self, elapsed_ms: f64) -> TargetLabel {
        match self.phrases.get(self.phase_at(elapsed_ms)) {
            Some(phrase) => TargetLabel::Text(phrase.clone()),
            None => TargetLabel::Heart,
        }
    }

    /// Label used before the scene starts
    pub fn initial_label(&self) -> TargetLabel {
        match self.phrases.first() {
            Some(phrase) => TargetLabel::Text(phrase.clone()),
            None => TargetLabel::Heart,
        }
    }

    /// Caption shown over the canvas while a phrase is active
    pub fn overlay_text_at(&self, elapsed_ms: f64) -> Option<&str> {
        self.phrases
            .get(self.phase_at(elapsed_ms))
            .map(|phrase| phrase.as_str())
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        self.phase_at(elapsed_ms) >= self.phrases.len()
    }

    pub fn total_ms(&self) -> u64 {
        self.phrases.len() as u64 * self.interval_ms as u64
    }
}

/// How particles behave at the viewport edges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BoundarySetting {
    Wrap,
    Unbounded,
}

/// Which heart formation to sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HeartShape {
    Simple,
    Layered,
}

/// Partial field configuration, applied on top of a preset.
/// Every field is optional so settings files only list what they change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldSettings {
    pub density_divisor: Option<f32>,
    pub min_particles: Option<usize>,
    pub text_damping: Option<f32>,
    pub heart_damping: Option<f32>,
    pub text_attraction: Option<f32>,
    pub heart_attraction: Option<f32>,
    pub ambient_attraction: Option<f32>,
    pub ambient_fraction: Option<f32>,
    pub pointer_radius: Option<f32>,
    pub pointer_strength: Option<f32>,
    pub pulse_amplitude: Option<f32>,
    pub pulse_speed: Option<f32>,
    pub boundary: Option<BoundarySetting>,
    pub wrap_margin: Option<f32>,
    /// Alpha of the fade applied on heart frames; 0 clears fully
    pub trail_alpha: Option<f32>,
    pub heart_shape: Option<HeartShape>,
}

#[cfg(feature = "std")]
impl FieldSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
