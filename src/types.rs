use serde::{Deserialize, Serialize};

/// One endpoint eligible for speed testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorCandidate {
    pub country: String, // e.g. "Germany"
    pub url: String,     // e.g. "https://ftp.de.debian.org/debian/"
}

impl MirrorCandidate {
    pub fn new(country: &str, url: &str) -> Self {
        Self {
            country: country.to_string(),
            url: url.to_string(),
        }
    }
}

/// Labeled auxiliary endpoint derived from a ranked mirror,
/// e.g. the "security" or "updates" archive that pairs with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryUrl {
    pub label: String,
    pub url: String,
}

/// Outcome of probing one candidate. Only produced when at least one
/// sample succeeded; an all-failed probe yields no result at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorResult {
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_urls: Vec<SecondaryUrl>,
    pub country: String,
    /// Mean download speed over successful samples, KB/s.
    pub avg_speed: f64,
    /// Mean wall time of successful samples, seconds.
    pub response_time: f64,
    /// Successful samples / attempted passes, 0.0..=1.0.
    pub success_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    /// Composite score, filled in by the final ranking step.
    pub score: f64,
}

impl MirrorResult {
    pub fn new(candidate: &MirrorCandidate) -> Self {
        Self {
            url: candidate.url.clone(),
            secondary_urls: Vec::new(),
            country: candidate.country.clone(),
            avg_speed: 0.0,
            response_time: 0.0,
            success_rate: 0.0,
            error_msg: None,
            score: 0.0,
        }
    }
}
