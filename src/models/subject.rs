use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::week::Week;
use crate::planning::dates::parse_semester_start;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
    #[serde(rename = "yearly")]
    Yearly,
}

impl Semester {
    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::First => "1st",
            Semester::Second => "2nd",
            Semester::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Semester {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1st" | "first" => Ok(Semester::First),
            "2nd" | "second" => Ok(Semester::Second),
            "yearly" => Ok(Semester::Yearly),
            other => Err(format!("unknown semester: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub semester: Semester,
    pub start_week: i32,
    pub end_week: i32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub weeks: Vec<Week>,
    #[serde(
        default,
        deserialize_with = "semester_start_from_wire",
        skip_serializing_if = "Option::is_none"
    )]
    pub semester_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Subject {
    pub fn total_weeks(&self) -> i32 {
        self.end_week - self.start_week + 1
    }

    pub fn completed_week_count(&self) -> usize {
        self.weeks.iter().filter(|w| w.is_complete()).count()
    }

    /// A subject without weeks is never considered finished.
    pub fn all_weeks_completed(&self) -> bool {
        !self.weeks.is_empty() && self.weeks.iter().all(|w| w.is_complete())
    }

    pub fn week_by_number(&self, week_number: i32) -> Option<&Week> {
        self.weeks.iter().find(|w| w.week_number == week_number)
    }

    pub fn sorted_weeks(&self) -> Vec<&Week> {
        let mut weeks: Vec<&Week> = self.weeks.iter().collect();
        weeks.sort_by_key(|w| w.week_number);
        weeks
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Week>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Week>>::deserialize(deserializer)?.unwrap_or_default())
}

fn semester_start_from_wire<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_semester_start(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubjectRequest {
    pub name: String,
    pub semester: Semester,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<Semester>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_subject_with_missing_weeks() {
        let subject: Subject = serde_json::from_str(
            r#"{"id":3,"name":"Physics","semester":"2nd","startWeek":17,"endWeek":19,
                "semesterStartDate":"2025-03-03T00:00:00.000Z",
                "createdAt":"2025-01-01","updatedAt":"2025-01-02"}"#,
        )
        .unwrap();

        assert_eq!(subject.semester, Semester::Second);
        assert!(subject.weeks.is_empty());
        assert_eq!(subject.total_weeks(), 3);
        assert_eq!(
            subject.semester_start_date,
            NaiveDate::from_ymd_opt(2025, 3, 3)
        );
        assert!(!subject.all_weeks_completed());
    }

    #[test]
    fn semester_parses_cli_spellings() {
        assert_eq!("first".parse::<Semester>().unwrap(), Semester::First);
        assert_eq!("2ND".parse::<Semester>().unwrap(), Semester::Second);
        assert!("third".parse::<Semester>().is_err());
        assert_eq!(serde_json::to_string(&Semester::Yearly).unwrap(), "\"yearly\"");
    }

    #[test]
    fn update_request_omits_absent_fields() {
        let body = serde_json::to_value(UpdateSubjectRequest {
            name: Some("Chemistry".to_string()),
            semester: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "Chemistry"}));
    }
}
