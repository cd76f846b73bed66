//! ProfileDocument, the single input every theme renders.
//!
//! Profile files come from many hands and are rarely complete. Every field is
//! optional, and a field holding the wrong JSON type (a number where a string
//! was expected, an object where a list was expected) degrades to "absent"
//! instead of failing the whole document.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDocument {
    #[serde(default, deserialize_with = "text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub contact: Option<Contact>,
    #[serde(default, deserialize_with = "list")]
    pub links: Vec<Link>,
    #[serde(default, deserialize_with = "list")]
    pub work_experiences: Vec<Experience>,
    #[serde(default, deserialize_with = "list")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "list")]
    pub extra_experiences: Vec<Experience>,
    #[serde(default, deserialize_with = "list")]
    pub skills: Vec<Skill>,
    #[serde(default, deserialize_with = "list")]
    pub custom_sections: Vec<CustomSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "text")]
    pub line1: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub line2: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, deserialize_with = "text")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub end: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ongoing: Option<bool>,
}

impl DateRange {
    /// "start – end", with "Present" for ongoing ranges. `None` when the range is empty.
    pub fn display(&self) -> Option<String> {
        let end = if self.ongoing.unwrap_or(false) {
            Some("Present".to_string())
        } else {
            self.end.clone()
        };
        match (&self.start, end) {
            (Some(start), Some(end)) => Some(format!("{start} – {end}")),
            (Some(start), None) => Some(start.clone()),
            (None, Some(end)) => Some(end),
            (None, None) => None,
        }
    }
}

/// Work and extra experiences share one shape; extras also carry `name`, `role`,
/// `type` and an optional `link`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, deserialize_with = "text")]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub employer: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub role: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<DateRange>,
    #[serde(default, deserialize_with = "text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text_list")]
    pub bullets: Vec<String>,
    #[serde(default, deserialize_with = "text")]
    pub link: Option<String>,
}

impl Experience {
    /// Primary heading: job title for work entries, name for extras.
    pub fn title(&self) -> Option<&str> {
        self.job_title.as_deref().or(self.name.as_deref())
    }

    /// Secondary heading: employer for work entries, role for extras.
    pub fn organization(&self) -> Option<&str> {
        self.employer.as_deref().or(self.role.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "text")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub school_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<DateRange>,
    #[serde(default, deserialize_with = "text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "text_list")]
    pub majors: Vec<String>,
    #[serde(default, deserialize_with = "text_list")]
    pub minors: Vec<String>,
    #[serde(default, deserialize_with = "text")]
    pub gpa: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub education_description: Option<String>,
    #[serde(default, deserialize_with = "text_list")]
    pub awards: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// 1 (beginner) through 4 (expert).
    pub fn rank(self) -> u8 {
        match self {
            SkillLevel::Beginner => 1,
            SkillLevel::Intermediate => 2,
            SkillLevel::Advanced => 3,
            SkillLevel::Expert => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
            SkillLevel::Expert => "expert",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub level: Option<SkillLevel>,
    #[serde(default, deserialize_with = "text")]
    pub years_experience: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomSection {
    #[serde(rename = "type", default, deserialize_with = "text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    /// Loosely-typed records; only `name` is assumed. Non-object elements are dropped.
    #[serde(default, deserialize_with = "list")]
    pub elements: Vec<Map<String, Value>>,
}

impl ProfileDocument {
    /// "First Last", trimmed. Empty when neither name is present.
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{first} {last}").trim().to_string()
    }
}

/// Reads a scalar field of a loosely-typed custom element as display text.
pub fn element_text(element: &Map<String, Value>, key: &str) -> Option<String> {
    element.get(key).and_then(scalar_text)
}

/// Reads a list-of-strings field of a loosely-typed custom element.
pub fn element_list(element: &Map<String, Value>, key: &str) -> Vec<String> {
    match element.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient deserializers
// ────────────────────────────────────────────────────────────────────────────

/// Any value that fails to deserialize as `T` becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Strings, numbers and booleans become text; blanks and everything else are absent.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

/// Keeps the array elements that deserialize as `T`; non-arrays become empty.
fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(&other).into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_is_a_valid_profile() {
        let profile: ProfileDocument = serde_json::from_value(json!({})).unwrap();
        assert!(profile.first_name.is_none());
        assert!(profile.work_experiences.is_empty());
        assert_eq!(profile.full_name(), "");
    }

    #[test]
    fn test_wrong_types_degrade_to_absent() {
        let profile: ProfileDocument = serde_json::from_value(json!({
            "first_name": "Ada",
            "last_name": null,
            "contact": "not an object",
            "links": {"name": "oops"},
            "skills": [
                {"name": "Rust", "level": "expert", "years_experience": 6},
                {"name": "Go", "level": 80},
                "stray string"
            ]
        }))
        .unwrap();

        assert_eq!(profile.full_name(), "Ada");
        assert!(profile.contact.is_none());
        assert!(profile.links.is_empty());
        assert_eq!(profile.skills.len(), 2);
        assert_eq!(profile.skills[0].level, Some(SkillLevel::Expert));
        assert_eq!(profile.skills[0].years_experience.as_deref(), Some("6"));
        assert_eq!(profile.skills[1].level, None);
    }

    #[test]
    fn test_gpa_accepts_number_or_string() {
        let education: Vec<Education> = serde_json::from_value(json!([
            {"degree": "BSc", "gpa": 3.8},
            {"degree": "MSc", "gpa": "4.0"}
        ]))
        .unwrap();
        assert_eq!(education[0].gpa.as_deref(), Some("3.8"));
        assert_eq!(education[1].gpa.as_deref(), Some("4.0"));
    }

    #[test]
    fn test_date_range_display() {
        let ongoing = DateRange {
            start: Some("2021".into()),
            end: Some("2022".into()),
            ongoing: Some(true),
        };
        assert_eq!(ongoing.display().as_deref(), Some("2021 – Present"));

        let closed = DateRange {
            start: Some("2018".into()),
            end: Some("2020".into()),
            ongoing: None,
        };
        assert_eq!(closed.display().as_deref(), Some("2018 – 2020"));
        assert!(DateRange::default().display().is_none());
    }

    #[test]
    fn test_custom_section_elements_are_loose() {
        let section: CustomSection = serde_json::from_value(json!({
            "type": "certifications",
            "name": "Certifications",
            "elements": [
                {"name": "CKA", "issuer": "CNCF", "year": 2023, "bullets": ["a", 2]},
                42
            ]
        }))
        .unwrap();

        assert_eq!(section.elements.len(), 1);
        let element = &section.elements[0];
        assert_eq!(element_text(element, "name").as_deref(), Some("CKA"));
        assert_eq!(element_text(element, "year").as_deref(), Some("2023"));
        assert_eq!(element_list(element, "bullets"), vec!["a", "2"]);
        assert!(element_text(element, "missing").is_none());
    }
}
