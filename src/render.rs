use serde::{Deserialize, Serialize, Serializer};
use std::f64::consts::PI;
use std::fmt;
use thiserror::Error;

use crate::analysis::{AnalysisResult, Confidence, Metrics};

pub const SHORT_TEXT_WARNING: &str =
    "Text too short: Analysis of texts under 150 characters may be less accurate.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BandConfigError {
    #[error("high threshold ({high}) must be greater than low threshold ({low})")]
    Inverted { high: f64, low: f64 },
    #[error("thresholds must lie strictly between 0 and 100 (high={high}, low={low})")]
    OutOfRange { high: f64, low: f64 },
    #[error("mixed alpha span must be a positive number (got {0})")]
    InvalidSpan(f64),
    #[error("ring radius must be a positive number (got {0})")]
    InvalidRadius(f64),
}

/// Threshold policy shared by the overall score and every sentence score.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BandConfig {
    pub high_threshold: f64,
    pub low_threshold: f64,
    /// Denominator of the mixed-band highlight alpha, `(score - low) / span`.
    pub mixed_alpha_span: f64,
}

impl BandConfig {
    /// 70/30 profile.
    pub fn standard() -> Self {
        Self {
            high_threshold: 70.0,
            low_threshold: 30.0,
            mixed_alpha_span: 80.0,
        }
    }

    /// 65/35 profile.
    pub fn compliance() -> Self {
        Self {
            high_threshold: 65.0,
            low_threshold: 35.0,
            mixed_alpha_span: 65.0,
        }
    }

    pub fn profile(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::standard()),
            "compliance" => Some(Self::compliance()),
            _ => None,
        }
    }

    pub fn new(high: f64, low: f64, mixed_alpha_span: f64) -> Result<Self, BandConfigError> {
        let config = Self {
            high_threshold: high,
            low_threshold: low,
            mixed_alpha_span,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BandConfigError> {
        let (high, low) = (self.high_threshold, self.low_threshold);
        if !high.is_finite() || !low.is_finite() || low <= 0.0 || high >= 100.0 {
            return Err(BandConfigError::OutOfRange { high, low });
        }
        if high <= low {
            return Err(BandConfigError::Inverted { high, low });
        }
        if !self.mixed_alpha_span.is_finite() || self.mixed_alpha_span <= 0.0 {
            return Err(BandConfigError::InvalidSpan(self.mixed_alpha_span));
        }
        Ok(())
    }

    /// Both boundaries are closed: `score == high` is `High`, `score == low` is `Low`.
    pub fn classify(&self, score: f64) -> Classification {
        let score = clamp_score(score);
        let (high, low) = (self.high_threshold, self.low_threshold);
        if score >= high {
            Classification {
                band: Band::High,
                intensity: ((score - high) / (100.0 - high)).min(1.0),
            }
        } else if score <= low {
            Classification {
                band: Band::Low,
                intensity: ((low - score) / low).min(1.0),
            }
        } else {
            Classification {
                band: Band::Mixed,
                intensity: ((score - low) / (high - low)).clamp(0.0, 1.0),
            }
        }
    }

    /// Background color of a sentence span with the given score.
    pub fn highlight_color(&self, score: f64) -> Rgba {
        let score = clamp_score(score);
        let class = self.classify(score);
        let alpha = match class.band {
            Band::High => 0.2 + class.intensity * 0.5,
            Band::Low => 0.1 + class.intensity * 0.3,
            Band::Mixed => 0.1 + (score - self.low_threshold) / self.mixed_alpha_span,
        };
        let (r, g, b) = class.band.highlight_rgb();
        Rgba {
            r,
            g,
            b,
            a: alpha.clamp(0.0, 1.0),
        }
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self::compliance()
    }
}

/// Geometry of the circular score indicator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RingGeometry {
    pub radius: f64,
}

impl RingGeometry {
    pub fn new(radius: f64) -> Result<Self, BandConfigError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(BandConfigError::InvalidRadius(radius));
        }
        Ok(Self { radius })
    }

    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius
    }

    /// Stroke dash offset: the full circumference at 0, zero at 100.
    pub fn offset(&self, score: f64) -> f64 {
        let circumference = self.circumference();
        circumference - (clamp_score(score) / 100.0) * circumference
    }
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self { radius: 70.0 }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    pub bands: BandConfig,
    pub ring: RingGeometry,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    High,
    Mixed,
    Low,
}

impl Band {
    pub fn gradient(&self) -> Gradient {
        match self {
            Band::High => Gradient {
                from: "#ef4444",
                to: "#dc2626",
            },
            Band::Mixed => Gradient {
                from: "#f59e0b",
                to: "#d97706",
            },
            Band::Low => Gradient {
                from: "#10b981",
                to: "#059669",
            },
        }
    }

    pub fn label_color(&self) -> &'static str {
        self.gradient().from
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            Band::High => "High probability of synthetic patterns. The writing style matches known AI generation models.",
            Band::Mixed => "Mixed structural signals detected. The text contains both machine-like consistency and human-like variation.",
            Band::Low => "Likely human writing. The text exhibits natural structural variation and lexical diversity.",
        }
    }

    pub fn risk_type(&self) -> &'static str {
        match self {
            Band::High => "High",
            Band::Mixed => "Mixed",
            Band::Low => "Likely Human",
        }
    }

    fn pattern_family(&self) -> &'static str {
        match self {
            Band::High => "AI models",
            Band::Mixed => "mixed composition",
            Band::Low => "human writing",
        }
    }

    fn highlight_rgb(&self) -> (u8, u8, u8) {
        match self {
            Band::High => (239, 68, 68),
            Band::Mixed => (102, 126, 234),
            Band::Low => (16, 185, 129),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub band: Band,
    /// Position within the band, in `[0, 1]`.
    pub intensity: f64,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Gradient {
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WarningStyle {
    Error,
    Caution,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Warning {
    pub style: WarningStyle,
    pub message: String,
}

/// A non-empty modality warning wins over the short-text warning.
pub fn select_warning(modality_warning: Option<&str>, is_reliable: bool) -> Option<Warning> {
    match modality_warning {
        Some(message) if !message.trim().is_empty() => Some(Warning {
            style: WarningStyle::Error,
            message: message.to_string(),
        }),
        _ if !is_reliable => Some(Warning {
            style: WarningStyle::Caution,
            message: SHORT_TEXT_WARNING.to_string(),
        }),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Perplexity,
    Burstiness,
    Repetition,
    PerplexityVariance,
}

impl MetricKind {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Perplexity => "Perplexity",
            MetricKind::Burstiness => "Burstiness",
            MetricKind::Repetition => "Repetition",
            MetricKind::PerplexityVariance => "Perplexity Variance",
        }
    }

    fn precision(&self) -> usize {
        match self {
            MetricKind::Perplexity => 2,
            _ => 3,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricBar {
    pub metric: MetricKind,
    pub label: &'static str,
    /// Raw metric value formatted for display.
    pub value_text: String,
    /// Bar width in percent, taken from the paired `*_score` field.
    pub bar_width: f64,
}

impl MetricBar {
    fn new(metric: MetricKind, value: f64, score: f64) -> Self {
        Self {
            metric,
            label: metric.label(),
            value_text: format!("{:.*}", metric.precision(), value),
            bar_width: clamp_score(score),
        }
    }
}

pub fn metric_bars(metrics: &Metrics) -> Vec<MetricBar> {
    let mut bars = vec![
        MetricBar::new(
            MetricKind::Perplexity,
            metrics.perplexity,
            metrics.perplexity_score,
        ),
        MetricBar::new(
            MetricKind::Burstiness,
            metrics.burstiness,
            metrics.burstiness_score,
        ),
        MetricBar::new(
            MetricKind::Repetition,
            metrics.repetition,
            metrics.repetition_score,
        ),
    ];
    if let (Some(value), Some(score)) = (
        metrics.perplexity_variance,
        metrics.perplexity_variance_score,
    ) {
        bars.push(MetricBar::new(MetricKind::PerplexityVariance, value, score));
    }
    bars
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentenceHighlight {
    pub text: String,
    pub band: Band,
    pub background_color: Rgba,
    pub tooltip: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub score_text: String,
    pub label: String,
    pub label_color: &'static str,
    pub explanation: &'static str,
    pub confidence: String,
    pub confidence_explanation: &'static str,
    pub band: Band,
    pub gradient: Gradient,
    pub ring_circumference: f64,
    pub ring_offset: f64,
    pub warning: Option<Warning>,
    pub metric_bars: Vec<MetricBar>,
    pub sentence_highlights: Vec<SentenceHighlight>,
}

pub fn render(result: &AnalysisResult, config: &RenderConfig) -> DisplayState {
    let bands = &config.bands;
    let score = clamp_score(result.score);
    let overall = bands.classify(score);
    // Explanation text follows the score as displayed (rounded).
    let displayed = bands.classify(score.round());

    let sentence_highlights = result
        .sentence_scores
        .iter()
        .map(|sentence| {
            let sentence_score = clamp_score(sentence.score);
            let band = bands.classify(sentence_score).band;
            SentenceHighlight {
                text: sentence.text.clone(),
                band,
                background_color: bands.highlight_color(sentence_score),
                tooltip: format!(
                    "AI Writing Risk: {:.1}% ({})\nThis segment matches statistical patterns common in {}.",
                    sentence_score,
                    band.risk_type(),
                    band.pattern_family()
                ),
            }
        })
        .collect();

    DisplayState {
        score_text: format!("{}", score.round() as i64),
        label: result.label.clone(),
        label_color: overall.band.label_color(),
        explanation: displayed.band.explanation(),
        confidence: result.confidence.clone(),
        confidence_explanation: Confidence::from(result.confidence.as_str()).explanation(),
        band: overall.band,
        gradient: overall.band.gradient(),
        ring_circumference: config.ring.circumference(),
        ring_offset: config.ring.offset(score),
        warning: select_warning(result.modality_warning.as_deref(), result.is_reliable),
        metric_bars: metric_bars(&result.metrics),
        sentence_highlights,
    }
}

/// NaN reads as 0; everything else is clamped into `[0, 100]`.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}
