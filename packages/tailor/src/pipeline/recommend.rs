//! Template recommendation and the career signals that feed it.
//!
//! The signals are computed locally and written into the prompt; they never
//! short-circuit the model call. Any failure of the call or its parsing
//! returns [`TemplateRecommendation::fallback`].

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, TailorError};
use crate::pipeline::extract::parse_model_json;
use crate::pipeline::prompts::{format_template_prompt, TEMPLATE_SYSTEM};
use crate::traits::ai::{Completion, GenerationClient};
use crate::types::{
    CareerSignals, Experience, GenerationParams, StructuredCandidateData, TailorConfig,
    TemplateKind, TemplateRecommendation,
};

const SENIOR_KEYWORDS: [&str; 6] = ["senior", "lead", "manager", "director", "principal", "architect"];
const JUNIOR_KEYWORDS: [&str; 5] = ["junior", "associate", "assistant", "intern", "trainee"];
const ONGOING: [&str; 5] = ["present", "current", "now", "ongoing", "today"];

/// Months between consecutive roles before it counts as a gap.
pub const GAP_THRESHOLD_MONTHS: i32 = 6;

/// Compute the signals for `data`, with "Present" meaning today.
pub fn career_signals(data: &StructuredCandidateData) -> CareerSignals {
    career_signals_at(data, Utc::now().date_naive())
}

/// [`career_signals`] with an explicit date for ongoing roles.
pub fn career_signals_at(data: &StructuredCandidateData, today: NaiveDate) -> CareerSignals {
    CareerSignals {
        experience_count: data.experience.len(),
        linear_progression: has_linear_progression(&data.experience),
        employment_gaps: has_employment_gaps(&data.experience, today),
        career_change: has_career_change(&data.experience),
        skills_strength: data.skills_strength(),
        projects_count: data.projects.len(),
    }
}

/// Senior and junior titles both present. A single role counts as linear.
pub fn has_linear_progression(experience: &[Experience]) -> bool {
    if experience.len() < 2 {
        return true;
    }

    let titles = experience
        .iter()
        .map(|e| e.role.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    SENIOR_KEYWORDS.iter().any(|k| titles.contains(k))
        && JUNIOR_KEYWORDS.iter().any(|k| titles.contains(k))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RoleCluster {
    Tech,
    Management,
    Analyst,
    Business,
}

fn role_cluster(role: &str) -> Option<RoleCluster> {
    let role = role.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| role.contains(w));

    if has(&["developer", "engineer"]) {
        Some(RoleCluster::Tech)
    } else if has(&["manager", "director"]) {
        Some(RoleCluster::Management)
    } else if has(&["analyst", "consultant"]) {
        Some(RoleCluster::Analyst)
    } else if has(&["sales", "marketing"]) {
        Some(RoleCluster::Business)
    } else {
        None
    }
}

/// Roles fall into two or more of the tech / management / analyst / business
/// clusters.
pub fn has_career_change(experience: &[Experience]) -> bool {
    if experience.len() < 2 {
        return false;
    }

    let mut clusters: Vec<RoleCluster> = experience
        .iter()
        .filter_map(|e| role_cluster(&e.role))
        .collect();
    clusters.sort_by_key(|c| *c as u8);
    clusters.dedup();
    clusters.len() >= 2
}

/// More than [`GAP_THRESHOLD_MONTHS`] between the end of the roles so far
/// and the start of the next one.
///
/// Only entries with both dates readable are considered; with fewer than two
/// such entries there is nothing to compare and the answer is `false`.
pub fn has_employment_gaps(experience: &[Experience], today: NaiveDate) -> bool {
    let mut intervals: Vec<(NaiveDate, NaiveDate)> = experience
        .iter()
        .filter_map(|e| {
            let start = parse_cv_date(&e.start_date, DateBound::Start, today)?;
            let end = parse_cv_date(&e.end_date, DateBound::End, today)?;
            Some((start, end.max(start)))
        })
        .collect();

    if intervals.len() < 2 {
        return false;
    }

    intervals.sort();
    let mut covered_until = intervals[0].1;
    for &(start, end) in &intervals[1..] {
        if months_between(covered_until, start) > GAP_THRESHOLD_MONTHS {
            debug!(%covered_until, next_start = %start, "Employment gap found");
            return true;
        }
        covered_until = covered_until.max(end);
    }
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateBound {
    Start,
    End,
}

/// Read the free-form dates CVs use: "Jan 2023", "January 2023", "2023",
/// "2020-01", "01/2020", "Present". Day precision is dropped; a bare year
/// is January for a start date and December for an end date.
fn parse_cv_date(text: &str, bound: DateBound, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    if ONGOING.iter().any(|w| text.starts_with(w)) {
        return NaiveDate::from_ymd_opt(today.year(), today.month(), 1);
    }

    let parts: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '/' | '.' | ','))
        .filter(|p| !p.is_empty())
        .collect();

    let mut year = None;
    let mut month = None;
    for part in parts {
        if let Ok(n) = part.parse::<u32>() {
            if (1900..=2200).contains(&n) {
                year = Some(n as i32);
            } else if (1..=12).contains(&n) && month.is_none() {
                month = Some(n);
            }
        } else if let Some(m) = month_from_name(part) {
            month = Some(m);
        }
    }

    let year = year?;
    let month = month.unwrap_or(match bound {
        DateBound::Start => 1,
        DateBound::End => 12,
    });
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn month_from_name(word: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let prefix = word.get(..3)?;
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32
}

/// Read a recommendation answer, dropping alternatives that name no known
/// template instead of rejecting the whole answer.
pub fn parse_recommendation(raw: &str) -> Result<TemplateRecommendation> {
    let mut value: Value = parse_model_json(raw)
        .map_err(|e| TailorError::ExtractionFormat(e.to_string()))?;

    if let Some(alternatives) = value.get_mut("alternatives").and_then(Value::as_array_mut) {
        alternatives.retain(|alt| {
            alt.get("template")
                .cloned()
                .map(serde_json::from_value::<TemplateKind>)
                .is_some_and(|parsed| parsed.is_ok())
        });
    }

    let recommendation: TemplateRecommendation = serde_json::from_value(value)
        .map_err(|e| TailorError::ExtractionFormat(e.to_string()))?;
    Ok(recommendation.normalized())
}

/// Chooses a CV layout for a candidate and job.
pub struct TemplateRecommender {
    client: Arc<dyn GenerationClient>,
    params: GenerationParams,
}

impl TemplateRecommender {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self::from_config(client, &TailorConfig::default())
    }

    pub fn from_config(client: Arc<dyn GenerationClient>, config: &TailorConfig) -> Self {
        Self {
            client,
            params: config.recommend,
        }
    }

    /// Never fails; see [`TemplateRecommendation::fallback`].
    #[instrument(skip_all, fields(experience = data.experience.len()))]
    pub async fn recommend_template(
        &self,
        job: &str,
        data: &StructuredCandidateData,
    ) -> TemplateRecommendation {
        let signals = career_signals(data);
        debug!(?signals, "Career signals");

        match self.try_recommend(job, &signals).await {
            Ok(recommendation) => {
                info!(
                    template = %recommendation.recommended_template,
                    confidence = recommendation.confidence_score,
                    "Template recommended"
                );
                recommendation
            }
            Err(e) => {
                warn!(error = %e, "Template recommendation failed, using fallback");
                TemplateRecommendation::fallback()
            }
        }
    }

    async fn try_recommend(&self, job: &str, signals: &CareerSignals) -> Result<TemplateRecommendation> {
        let request = Completion::new(TEMPLATE_SYSTEM, format_template_prompt(job, signals))
            .max_tokens(self.params.max_tokens)
            .temperature(self.params.temperature);

        let raw = self.client.complete(request).await?;
        parse_recommendation(&raw)
    }
}
