use chrono::NaiveDate;

use crate::model::{Grade, GradeType, Subject, SubjectCategory};

pub(crate) trait TestHelper {
    fn assert_approx_eq(&self, expected: Self);
}

impl TestHelper for f64 {
    fn assert_approx_eq(&self, expected: Self) {
        assert!(
            (self - expected).abs() < 1e-9,
            "expected {expected}, got {self}"
        );
    }
}

impl<const N: usize> TestHelper for [f64; N] {
    fn assert_approx_eq(&self, expected: Self) {
        for (a, b) in self.iter().zip(expected) {
            a.assert_approx_eq(b);
        }
    }
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn main_subject(id: &str, written: f64, oral: f64) -> Subject {
    Subject::new(id, id, SubjectCategory::MainSubject, 10)
        .unwrap()
        .with_tier_weights(written, oral)
        .unwrap()
}

pub(crate) fn minor_subject(id: &str) -> Subject {
    Subject::new(id, id, SubjectCategory::MinorSubject, 10).unwrap()
}

pub(crate) fn written(subject_id: &str, value: f64, weight: f64) -> Grade {
    graded(subject_id, GradeType::WrittenExam, value, weight)
}

pub(crate) fn oral(subject_id: &str, value: f64, weight: f64) -> Grade {
    graded(subject_id, GradeType::OralGrade, value, weight)
}

fn graded(subject_id: &str, grade_type: GradeType, value: f64, weight: f64) -> Grade {
    let id = format!("{subject_id}-{grade_type}-{value}-{weight}");
    Grade::new(id, subject_id, grade_type, value, weight, date(2024, 2, 1)).unwrap()
}
