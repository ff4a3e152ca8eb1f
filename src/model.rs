use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{NotenError, Result};

pub(crate) const GRADE_MIN: f64 = 1.0;
pub(crate) const GRADE_MAX: f64 = 6.0;

/// Weighting category of a subject within the overall average.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum SubjectCategory {
    #[strum(serialize = "Hauptfach")]
    #[serde(rename = "Hauptfach")]
    MainSubject,
    #[strum(serialize = "Nebenfach")]
    #[serde(rename = "Nebenfach")]
    MinorSubject,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum GradeType {
    #[strum(serialize = "Schulaufgabe")]
    #[serde(rename = "Schulaufgabe")]
    WrittenExam,
    #[strum(serialize = "mündliche Note")]
    #[serde(rename = "mündliche Note")]
    OralGrade,
}

impl GradeType {
    pub(crate) fn other(self) -> Self {
        match self {
            GradeType::WrittenExam => GradeType::OralGrade,
            GradeType::OralGrade => GradeType::WrittenExam,
        }
    }
}

/// Relative weight of the written and the oral tier of a main subject,
/// e.g. 2:1 for "written exams count double".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierWeights {
    pub written: f64,
    pub oral: f64,
}

impl TierWeights {
    pub fn new(written: f64, oral: f64) -> Result<Self> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !valid(written) || !valid(oral) {
            return Err(NotenError::InvalidTierWeights);
        }
        Ok(Self { written, oral })
    }

    pub fn of(&self, grade_type: GradeType) -> f64 {
        match grade_type {
            GradeType::WrittenExam => self.written,
            GradeType::OralGrade => self.oral,
        }
    }

    /// 0:0 is treated the same as no tier weights at all.
    pub fn is_effective(&self) -> bool {
        self.written > 0.0 || self.oral > 0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubjectDocument", into = "SubjectDocument")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub category: SubjectCategory,
    pub grade_level: u32,
    /// Stored as the flat `writtenWeight`/`oralWeight` pair.
    pub tier_weights: Option<TierWeights>,
    /// Desired final average. Only used for display, never by the averaging itself.
    pub target_grade: Option<f64>,
}

/// Stored shape of a subject.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectDocument {
    id: String,
    name: String,
    category: SubjectCategory,
    grade_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    written_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    oral_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_grade: Option<f64>,
}

impl From<SubjectDocument> for Subject {
    fn from(doc: SubjectDocument) -> Self {
        let tier_weights = match (doc.written_weight, doc.oral_weight) {
            (Some(written), Some(oral)) => Some(TierWeights { written, oral }),
            _ => None,
        };
        Self {
            id: doc.id,
            name: doc.name,
            category: doc.category,
            grade_level: doc.grade_level,
            tier_weights,
            target_grade: doc.target_grade,
        }
    }
}

impl From<Subject> for SubjectDocument {
    fn from(subject: Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            category: subject.category,
            grade_level: subject.grade_level,
            written_weight: subject.tier_weights.map(|w| w.written),
            oral_weight: subject.tier_weights.map(|w| w.oral),
            target_grade: subject.target_grade,
        }
    }
}

impl Subject {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: SubjectCategory,
        grade_level: u32,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(NotenError::EmptyName);
        }
        Ok(Self {
            id: id.into(),
            name,
            category,
            grade_level,
            tier_weights: None,
            target_grade: None,
        })
    }

    pub fn with_tier_weights(mut self, written: f64, oral: f64) -> Result<Self> {
        self.tier_weights = Some(TierWeights::new(written, oral)?);
        Ok(self)
    }

    pub fn with_target_grade(mut self, target: f64) -> Result<Self> {
        if !(GRADE_MIN..=GRADE_MAX).contains(&target) {
            return Err(NotenError::InvalidGrade);
        }
        self.target_grade = Some(target);
        Ok(self)
    }

    /// The tier weights that actually drive the average: only main subjects
    /// use them, and only when at least one of them is positive.
    pub fn effective_tier_weights(&self) -> Option<TierWeights> {
        match self.category {
            SubjectCategory::MainSubject => self.tier_weights.filter(TierWeights::is_effective),
            SubjectCategory::MinorSubject => None,
        }
    }
}

/// One recorded or announced assessment of a subject. A missing `value`
/// marks a planned grade that does not count yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: String,
    pub subject_id: String,
    #[serde(rename = "type")]
    pub grade_type: GradeType,
    #[serde(default)]
    pub value: Option<f64>,
    pub weight: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Grade {
    pub fn new(
        id: impl Into<String>,
        subject_id: impl Into<String>,
        grade_type: GradeType,
        value: f64,
        weight: f64,
        date: NaiveDate,
    ) -> Result<Self> {
        if !(GRADE_MIN..=GRADE_MAX).contains(&value) {
            return Err(NotenError::InvalidGrade);
        }
        let mut grade = Self::planned(id, subject_id, grade_type, weight, date)?;
        grade.value = Some(value);
        Ok(grade)
    }

    pub fn planned(
        id: impl Into<String>,
        subject_id: impl Into<String>,
        grade_type: GradeType,
        weight: f64,
        date: NaiveDate,
    ) -> Result<Self> {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(NotenError::InvalidWeight);
        }
        Ok(Self {
            id: id.into(),
            subject_id: subject_id.into(),
            grade_type,
            value: None,
            weight,
            date,
            name: None,
            notes: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_planned(&self) -> bool {
        self.value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::date;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn grade_rejects_out_of_range_values() {
        let day = date(2024, 3, 1);
        assert_eq!(
            Grade::new("g1", "math", GradeType::WrittenExam, 0.5, 1.0, day),
            Err(NotenError::InvalidGrade)
        );
        assert_eq!(
            Grade::new("g1", "math", GradeType::WrittenExam, 6.5, 1.0, day),
            Err(NotenError::InvalidGrade)
        );
        assert!(Grade::new("g1", "math", GradeType::WrittenExam, 6.0, 1.0, day).is_ok());
        assert!(Grade::new("g1", "math", GradeType::WrittenExam, 1.0, 1.0, day).is_ok());
    }

    #[test]
    fn grade_rejects_non_positive_weights() {
        let day = date(2024, 3, 1);
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(
                Grade::planned("g1", "math", GradeType::OralGrade, weight, day),
                Err(NotenError::InvalidWeight)
            );
        }
    }

    #[test]
    fn planned_grade_has_no_value() {
        let grade = Grade::planned("g1", "math", GradeType::WrittenExam, 2.0, date(2024, 5, 6))
            .unwrap()
            .with_name("2. Schulaufgabe");
        assert!(grade.is_planned());
        assert_eq!(grade.name.as_deref(), Some("2. Schulaufgabe"));
    }

    #[test]
    fn subject_validation() {
        assert_eq!(
            Subject::new("s", "  ", SubjectCategory::MainSubject, 10),
            Err(NotenError::EmptyName)
        );
        let subject = Subject::new("s", "Mathe", SubjectCategory::MainSubject, 10).unwrap();
        assert_eq!(
            subject.clone().with_tier_weights(-1.0, 1.0),
            Err(NotenError::InvalidTierWeights)
        );
        assert_eq!(
            subject.clone().with_target_grade(0.9),
            Err(NotenError::InvalidGrade)
        );
        assert_eq!(
            subject.with_target_grade(2.0).unwrap().target_grade,
            Some(2.0)
        );
    }

    #[test]
    fn effective_tier_weights() {
        let main = Subject::new("s", "Deutsch", SubjectCategory::MainSubject, 9).unwrap();
        assert_eq!(main.effective_tier_weights(), None);
        let zero = main.clone().with_tier_weights(0.0, 0.0).unwrap();
        assert_eq!(zero.effective_tier_weights(), None);
        let weighted = main.with_tier_weights(2.0, 1.0).unwrap();
        assert_eq!(
            weighted.effective_tier_weights(),
            Some(TierWeights {
                written: 2.0,
                oral: 1.0
            })
        );
        let minor = Subject::new("s", "Musik", SubjectCategory::MinorSubject, 9)
            .unwrap()
            .with_tier_weights(2.0, 1.0)
            .unwrap();
        assert_eq!(minor.effective_tier_weights(), None);
    }

    #[test]
    fn enum_names_match_stored_documents() {
        assert_eq!(GradeType::OralGrade.to_string(), "mündliche Note");
        assert_eq!(
            GradeType::from_str("Schulaufgabe"),
            Ok(GradeType::WrittenExam)
        );
        assert_eq!(
            SubjectCategory::iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            ["Hauptfach", "Nebenfach"]
        );
        assert!(SubjectCategory::from_str("hauptfach").is_err());
    }

    #[test]
    fn subject_document_with_tier_weights() {
        let subject: Subject = serde_json::from_str(
            r#"{"id":"m","name":"Mathe","category":"Hauptfach","gradeLevel":10,"writtenWeight":2,"oralWeight":1}"#,
        )
        .unwrap();
        assert_eq!(
            subject.tier_weights,
            Some(TierWeights {
                written: 2.0,
                oral: 1.0
            })
        );
        assert_eq!(subject.target_grade, None);

        let json = serde_json::to_value(&subject).unwrap();
        assert_eq!(json["writtenWeight"], 2.0);
        assert_eq!(json["oralWeight"], 1.0);
        assert!(json.get("tierWeights").is_none());
        assert!(json.get("targetGrade").is_none());
    }

    #[test]
    fn subject_document_without_tier_weights() {
        let subject: Subject = serde_json::from_str(
            r#"{"id":"ku","name":"Kunst","category":"Nebenfach","gradeLevel":7,"targetGrade":1.5}"#,
        )
        .unwrap();
        assert_eq!(subject.category, SubjectCategory::MinorSubject);
        assert_eq!(subject.tier_weights, None);
        assert_eq!(subject.target_grade, Some(1.5));

        // a lone weight is not a tier configuration
        let subject: Subject = serde_json::from_str(
            r#"{"id":"m","name":"Mathe","category":"Hauptfach","gradeLevel":10,"writtenWeight":2}"#,
        )
        .unwrap();
        assert_eq!(subject.tier_weights, None);
    }

    #[test]
    fn subject_document_round_trip() {
        let subject = Subject::new("de", "Deutsch", SubjectCategory::MainSubject, 9)
            .unwrap()
            .with_tier_weights(3.0, 1.0)
            .unwrap()
            .with_target_grade(2.0)
            .unwrap();
        let json = serde_json::to_string(&subject).unwrap();
        assert_eq!(serde_json::from_str::<Subject>(&json).unwrap(), subject);
    }

    #[test]
    fn grade_document() {
        let grade: Grade = serde_json::from_str(
            r#"{"id":"g","subjectId":"m","type":"mündliche Note","weight":1,"date":"2024-05-06"}"#,
        )
        .unwrap();
        assert_eq!(grade.grade_type, GradeType::OralGrade);
        assert!(grade.is_planned());
        assert_eq!(grade.date, date(2024, 5, 6));
    }
}
