use serde::{Deserialize, Serialize};

/// Descriptive label returned by the image analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// Confidence in percent (0-100)
    pub confidence: f32,
}

impl Label {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }

    /// `#` followed by the label name with every whitespace character removed.
    pub fn hashtag(&self) -> String {
        let compact: String = self.name.split_whitespace().collect();
        format!("#{}", compact)
    }
}

/// Category of inappropriate content detected in an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationFlag {
    pub name: String,
    /// Top-level category, absent for top-level flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    pub confidence: f32,
}

impl ModerationFlag {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            parent_name: None,
            confidence,
        }
    }
}

/// Recognized public figure (informational only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Celebrity {
    pub name: String,
    pub match_confidence: f32,
}

/// Result of analyzing one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub labels: Vec<Label>,
    pub moderation_flags: Vec<ModerationFlag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub celebrities: Vec<Celebrity>,
}

impl AnalysisReport {
    /// Any flag at all rejects the image; there is no threshold.
    pub fn is_flagged(&self) -> bool {
        !self.moderation_flags.is_empty()
    }

    /// Hashtags ordered by descending label confidence. Ties keep service order
    /// and duplicates are kept.
    pub fn hashtags(&self) -> Vec<String> {
        let mut ranked: Vec<&Label> = self.labels.iter().collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranked.into_iter().map(Label::hashtag).collect()
    }
}
