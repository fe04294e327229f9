//! Persona, committee and fused evaluation types.

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named evaluation viewpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Key in the committee result
    pub name: String,

    /// Who the model should be while evaluating
    pub description: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Technical Recruiter, HR Manager and Hiring Manager.
    pub fn default_committee() -> Vec<Persona> {
        vec![
            Persona::new(
                "Technical Recruiter",
                "a technical recruiter evaluating technical skills and experience relevant to the job",
            ),
            Persona::new(
                "HR Manager",
                "an HR manager evaluating cultural fit, communication skills and overall presentation",
            ),
            Persona::new(
                "Hiring Manager",
                "a hiring manager evaluating role-specific qualifications and potential for success",
            ),
        ]
    }
}

/// Hiring recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Hire,
    Maybe,
    No,
}

impl Recommendation {
    /// Read free model text ("hire", "Strong Hire", "maybe", "No Hire").
    /// Matches whole words; a `no`/`not` anywhere wins. Anything
    /// unrecognised is `No`.
    pub fn parse_lenient(text: &str) -> Self {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |word: &str| words.iter().any(|w| *w == word);

        if has("no") || has("not") {
            Self::No
        } else if has("maybe") {
            Self::Maybe
        } else if has("hire") {
            Self::Hire
        } else {
            Self::No
        }
    }
}

/// One persona's view of a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaEvaluation {
    pub persona_name: String,
    /// 1..=10, or 0 when the evaluation failed
    pub score: f64,
    pub strengths: String,
    pub improvements: String,
    pub recommendation: Recommendation,
    pub reasoning: String,
}

impl PersonaEvaluation {
    /// Zero-score result standing in for a failed evaluation.
    pub fn degraded(persona_name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            persona_name: persona_name.into(),
            score: 0.0,
            strengths: "Error in evaluation".to_string(),
            improvements: "Unable to evaluate".to_string(),
            recommendation: Recommendation::No,
            reasoning: format!("Error: {}", error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.score == 0.0
    }
}

/// Persona name → evaluation, in the order personas were given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitteeResult {
    pub evaluations: IndexMap<String, PersonaEvaluation>,
}

/// Aggregate view over a committee.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeReport {
    /// Mean over non-degraded evaluations, `None` if all failed
    pub average_score: Option<f64>,
    pub evaluated: usize,
    pub failed: usize,
    pub hire: usize,
    pub maybe: usize,
    pub no: usize,
}

impl CommitteeResult {
    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    pub fn get(&self, persona_name: &str) -> Option<&PersonaEvaluation> {
        self.evaluations.get(persona_name)
    }

    pub fn report(&self) -> CommitteeReport {
        let scored: Vec<f64> = self
            .evaluations
            .values()
            .filter(|e| !e.is_degraded())
            .map(|e| e.score)
            .collect();

        let count = |r: Recommendation| {
            self.evaluations
                .values()
                .filter(|e| e.recommendation == r)
                .count()
        };

        CommitteeReport {
            average_score: if scored.is_empty() {
                None
            } else {
                Some(scored.iter().sum::<f64>() / scored.len() as f64)
            },
            evaluated: self.evaluations.len(),
            failed: self.evaluations.len() - scored.len(),
            hire: count(Recommendation::Hire),
            maybe: count(Recommendation::Maybe),
            no: count(Recommendation::No),
        }
    }
}

/// Holistic evaluation folding retrieved context into one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteEvaluation {
    #[serde(alias = "overallScore", deserialize_with = "numeric_score")]
    pub overall_score: f64,

    #[serde(default, deserialize_with = "string_list")]
    pub strengths: Vec<String>,

    #[serde(default, alias = "areas_for_improvement", deserialize_with = "string_list")]
    pub weaknesses: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub recommendations: Vec<String>,

    #[serde(default)]
    pub summary: String,

    /// Anything else the model returned (keyword match, per-area scores, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A finite number, or a string like "8.5" / "8.5/10". "NaN" and "inf" are rejected.
fn numeric_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let score = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("/10").trim().parse::<f64>().ok(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "score must be a number, got {}",
                other
            )))
        }
    };
    score
        .filter(|s| s.is_finite())
        .ok_or_else(|| serde::de::Error::custom("score is not a finite number"))
}

fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    })
}
