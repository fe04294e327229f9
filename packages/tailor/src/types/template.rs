//! CV template recommendation types.

use serde::{Deserialize, Serialize};

/// CV layout families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    #[serde(alias = "reverse_chronological", alias = "chronological")]
    ReverseChronological,
    Functional,
    #[serde(alias = "hybrid")]
    Combination,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReverseChronological => "reverse-chronological",
            Self::Functional => "functional",
            Self::Combination => "combination",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Another template that could also work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateAlternative {
    pub template: TemplateKind,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecommendation {
    #[serde(alias = "recommended_template")]
    pub recommended_template: TemplateKind,

    /// 0..=100
    #[serde(alias = "confidence_score")]
    pub confidence_score: f64,

    #[serde(default)]
    pub reasoning: String,

    #[serde(default, alias = "format_explanation")]
    pub format_explanation: String,

    #[serde(default)]
    pub alternatives: Vec<TemplateAlternative>,
}

impl TemplateRecommendation {
    /// Returned whenever the recommendation call or its parsing fails.
    pub fn fallback() -> Self {
        Self {
            recommended_template: TemplateKind::Combination,
            confidence_score: 50.0,
            reasoning: "Unable to analyze CV data properly. Combination format is recommended \
                        as it works well for most candidates."
                .to_string(),
            format_explanation: "Combines skills emphasis with chronological work history for \
                                 maximum flexibility."
                .to_string(),
            alternatives: vec![
                TemplateAlternative {
                    template: TemplateKind::ReverseChronological,
                    reason: "Good for candidates with strong work history".to_string(),
                },
                TemplateAlternative {
                    template: TemplateKind::Functional,
                    reason: "Good for career changers or those with employment gaps".to_string(),
                },
            ],
        }
    }

    /// Clamp confidence into range; models sometimes answer 0.85 meaning 85.
    pub fn normalized(mut self) -> Self {
        if self.confidence_score > 0.0 && self.confidence_score <= 1.0 {
            self.confidence_score *= 100.0;
        }
        self.confidence_score = self.confidence_score.clamp(0.0, 100.0);
        self.alternatives
            .retain(|alt| alt.template != self.recommended_template);
        self
    }
}

/// Heuristic signals computed from experience before prompting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerSignals {
    pub experience_count: usize,
    pub linear_progression: bool,
    pub employment_gaps: bool,
    pub career_change: bool,
    pub skills_strength: usize,
    pub projects_count: usize,
}
