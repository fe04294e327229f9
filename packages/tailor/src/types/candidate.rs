//! Structured candidate data extracted from free-text CVs.
//!
//! The model is asked for a fixed schema but routinely omits keys, returns
//! `null` for dates, numbers for GPAs, or snake_case keys. Deserialization
//! here is total over any JSON object: every list defaults to empty, every
//! object to empty-string leaves, and scalar leaves are coerced to strings.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed nested shape a CV is extracted into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredCandidateData {
    #[serde(default, deserialize_with = "lenient_object")]
    pub personal: Personal,

    #[serde(default, alias = "professional_summary", deserialize_with = "lenient_string")]
    pub professional_summary: String,

    #[serde(default, deserialize_with = "lenient_list")]
    pub experience: Vec<Experience>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub education: Vec<Education>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub projects: Vec<Project>,

    #[serde(default, deserialize_with = "lenient_object")]
    pub skills: Skills,

    #[serde(
        default,
        alias = "licenses_certifications",
        alias = "licenses_and_certifications",
        deserialize_with = "lenient_list"
    )]
    pub licenses_and_certifications: Vec<Certification>,
}

impl StructuredCandidateData {
    /// Technical plus soft skills, the "skills strength" signal.
    pub fn skills_strength(&self) -> usize {
        self.skills.technical.len() + self.skills.soft.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personal {
    #[serde(default, alias = "full_name", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default, alias = "title", deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(default, alias = "start_date", deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, alias = "end_date", deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(default, alias = "school", deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub field: String,
    #[serde(default, alias = "start_date", deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, alias = "end_date", deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, alias = "tech_stack", deserialize_with = "lenient_strings")]
    pub tech_stack: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(default, alias = "start_date", deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, alias = "end_date", deserialize_with = "lenient_string")]
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub technical: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub soft: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issuer: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expiry: String,
}

// =============================================================================
// Lenient field deserializers
// =============================================================================

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// A list of strings; a bare string becomes a one-element list, nulls are dropped.
fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(scalar_to_string)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

/// An object; anything that is not an object becomes the default.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(serde::de::Error::custom),
        _ => Ok(T::default()),
    }
}

/// A list of objects; non-object entries are skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}
