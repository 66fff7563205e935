use serde::{Deserialize, Serialize};

/// Response body of the upstream `POST /api/analyze` endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub score: f64,
    pub label: String,
    pub confidence: String,
    pub metrics: Metrics,
    pub sentence_scores: Vec<SentenceScore>,
    pub is_reliable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality_warning: Option<String>,
}

/// Raw metric values paired with their 0-100 scores.
///
/// The raw value and the score are different quantities: the raw value is
/// only ever displayed as text, the score only ever drives a bar width.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    pub perplexity: f64,
    pub perplexity_score: f64,
    pub burstiness: f64,
    pub burstiness_score: f64,
    pub repetition: f64,
    pub repetition_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perplexity_variance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perplexity_variance_score: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SentenceScore {
    pub text: String,
    pub score: f64,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Unrecognised values fall back to `Low`, the most cautious reading.
impl From<&str> for Confidence {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

impl Confidence {
    pub fn explanation(&self) -> &'static str {
        match self {
            Confidence::High => "The analysis is very confident in this classification.",
            Confidence::Medium => {
                "The analysis has moderate confidence. Some indicators are mixed."
            }
            Confidence::Low => {
                "The analysis has low confidence. Results should be interpreted cautiously."
            }
        }
    }
}
