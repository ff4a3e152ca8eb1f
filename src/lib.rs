//! Grade averaging, target-grade solving and flashcard scheduling for Noten Meister.
//!
//! All operations are pure: records go in, new values come out. Reading and
//! writing the records is left to the caller.

mod average;
mod error;
mod model;
mod srs;
mod target;
#[cfg(test)]
mod test_helpers;

pub use average::{
    Average, AverageSettings, category_average, final_grade, overall_average, planned_grades,
    subject_averages,
};
pub use error::{NotenError, Result};
pub use model::{Grade, GradeType, Subject, SubjectCategory, TierWeights};
pub use srs::{NextStates, Rating, Scheduler, SchedulerConfig, SrsState, StudyCard};
pub use target::{OUT_OF_REACH, TargetGrade, grade_needed_for_target, target_outlook};
