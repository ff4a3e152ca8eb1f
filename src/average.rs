use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use log::debug;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use crate::error::{NotenError, Result};
use crate::model::{Grade, GradeType, Subject, SubjectCategory};

pub(crate) trait Round {
    fn to_2_decimal(self) -> f64;
}

impl Round for f64 {
    fn to_2_decimal(self) -> f64 {
        (self * 100.0).round() / 100.0
    }
}

/// A computed average, or the absence of one when nothing has been graded yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Average {
    NoAverage,
    Value(f64),
}

impl Average {
    fn from_ratio(value_sum: f64, weight_sum: f64) -> Self {
        let average = value_sum / weight_sum;
        if weight_sum > 0.0 && average.is_finite() {
            Average::Value(average)
        } else {
            Average::NoAverage
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Average::NoAverage => None,
            Average::Value(v) => Some(v),
        }
    }

    /// The value as it is displayed, i.e. rounded to two decimals.
    pub fn rounded(self) -> Option<f64> {
        self.value().map(Round::to_2_decimal)
    }

    /// True when there was nothing graded to average.
    pub fn is_none(self) -> bool {
        matches!(self, Average::NoAverage)
    }
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Average::NoAverage => write!(f, "-"),
            Average::Value(v) => write!(f, "{:.2}", v.to_2_decimal()),
        }
    }
}

/// How much main and minor subjects count towards the overall average.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AverageSettings {
    pub main_weight: f64,
    pub minor_weight: f64,
}

impl Default for AverageSettings {
    fn default() -> Self {
        Self {
            main_weight: 2.0,
            minor_weight: 1.0,
        }
    }
}

impl AverageSettings {
    pub fn new(main_weight: f64, minor_weight: f64) -> Result<Self> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !valid(main_weight) || !valid(minor_weight) {
            return Err(NotenError::InvalidSettings);
        }
        Ok(Self {
            main_weight,
            minor_weight,
        })
    }

    pub fn weight_for(&self, category: SubjectCategory) -> f64 {
        match category {
            SubjectCategory::MainSubject => self.main_weight,
            SubjectCategory::MinorSubject => self.minor_weight,
        }
    }
}

/// Running `Σ value·weight` and `Σ weight` over graded entries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct WeightedSum {
    pub value_sum: f64,
    pub weight_sum: f64,
    pub count: usize,
}

impl WeightedSum {
    fn push(&mut self, value: f64, weight: f64) {
        self.value_sum += value * weight;
        self.weight_sum += weight;
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn average(&self) -> Average {
        Average::from_ratio(self.value_sum, self.weight_sum)
    }

    fn average_or_zero(&self) -> f64 {
        self.average().value().unwrap_or(0.0)
    }
}

/// Graded entries split into their written and oral tier.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Tiers {
    pub written: WeightedSum,
    pub oral: WeightedSum,
}

impl Tiers {
    pub fn of<'a>(grades: impl IntoIterator<Item = &'a Grade>) -> Self {
        let mut tiers = Tiers::default();
        for grade in grades {
            if let Some(value) = grade.value {
                tiers.get_mut(grade.grade_type).push(value, grade.weight);
            }
        }
        tiers
    }

    pub fn get(&self, grade_type: GradeType) -> &WeightedSum {
        match grade_type {
            GradeType::WrittenExam => &self.written,
            GradeType::OralGrade => &self.oral,
        }
    }

    fn get_mut(&mut self, grade_type: GradeType) -> &mut WeightedSum {
        match grade_type {
            GradeType::WrittenExam => &mut self.written,
            GradeType::OralGrade => &mut self.oral,
        }
    }

    pub fn total(&self) -> WeightedSum {
        WeightedSum {
            value_sum: self.written.value_sum + self.oral.value_sum,
            weight_sum: self.written.weight_sum + self.oral.weight_sum,
            count: self.written.count + self.oral.count,
        }
    }
}

/// Final average of one subject from its grades. Planned grades are ignored.
///
/// Main subjects with effective tier weights average written exams and oral
/// grades separately and blend both tier averages by the tier weights. When
/// only one tier has grades, that tier's average is the final grade on its
/// own. Every other subject uses the flat weighted mean of all grades.
pub fn final_grade<'a>(subject: &Subject, grades: impl IntoIterator<Item = &'a Grade>) -> Average {
    let tiers = Tiers::of(grades);
    if tiers.total().is_empty() {
        return Average::NoAverage;
    }
    let Some(weights) = subject.effective_tier_weights() else {
        return tiers.total().average();
    };
    match (tiers.written.is_empty(), tiers.oral.is_empty()) {
        (false, false) => Average::from_ratio(
            tiers.written.average_or_zero() * weights.written
                + tiers.oral.average_or_zero() * weights.oral,
            weights.written + weights.oral,
        ),
        (false, true) => tiers.written.average(),
        (true, false) => tiers.oral.average(),
        (true, true) => Average::NoAverage,
    }
}

fn group_by_subject(grades: &[Grade]) -> HashMap<&str, Vec<&Grade>> {
    grades
        .iter()
        .into_group_map_by(|grade| grade.subject_id.as_str())
}

/// Rounded final averages of the subjects that have at least one graded entry.
fn graded_subjects<'a>(subjects: &'a [Subject], grades: &[Grade]) -> Vec<(&'a Subject, f64)> {
    let by_subject = group_by_subject(grades);
    subjects
        .iter()
        .filter_map(|subject| {
            let grades = by_subject.get(subject.id.as_str())?;
            match final_grade(subject, grades.iter().copied()).rounded() {
                Some(average) => Some((subject, average)),
                None => {
                    debug!("subject {} has no graded entries, skipping", subject.id);
                    None
                }
            }
        })
        .collect()
}

/// Mean of all subject averages, main and minor subjects weighted according
/// to `settings`. Subjects whose category weight is not positive are left out.
pub fn overall_average(subjects: &[Subject], grades: &[Grade], settings: &AverageSettings) -> Average {
    let (value_sum, weight_sum) = graded_subjects(subjects, grades)
        .into_iter()
        .filter_map(|(subject, average)| {
            let weight = settings.weight_for(subject.category);
            if weight > 0.0 {
                Some((average * weight, weight))
            } else {
                debug!(
                    "subject {} excluded, {} weight is {weight}",
                    subject.id, subject.category
                );
                None
            }
        })
        .fold((0.0, 0.0), |(v, w), (value, weight)| (v + value, w + weight));
    Average::from_ratio(value_sum, weight_sum)
}

/// Unweighted mean of the subject averages; every subject counts once.
pub fn category_average(subjects: &[Subject], grades: &[Grade]) -> Average {
    let (sum, count) = graded_subjects(subjects, grades)
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), (_, average)| (sum + average, count + 1));
    Average::from_ratio(sum, count as f64)
}

/// Final average of every subject, in the order of `subjects`.
pub fn subject_averages(subjects: &[Subject], grades: &[Grade]) -> Vec<(String, Average)> {
    let by_subject = group_by_subject(grades);
    subjects
        .par_iter()
        .map(|subject| {
            let average = by_subject
                .get(subject.id.as_str())
                .map_or(Average::NoAverage, |grades| {
                    final_grade(subject, grades.iter().copied())
                });
            (subject.id.clone(), average)
        })
        .collect()
}

/// Announced grades without a value yet, earliest first.
pub fn planned_grades(grades: &[Grade]) -> Vec<&Grade> {
    grades
        .iter()
        .filter(|grade| grade.is_planned())
        .sorted_by_key(|grade| grade.date)
        .collect()
}
