use log::debug;

use crate::average::{Round, Tiers, WeightedSum};
use crate::model::{GRADE_MAX, GRADE_MIN, Grade, GradeType, Subject};

/// Returned when the new grade's tier carries no weight and the remaining
/// grades miss the target, so no value of the new grade changes the outcome.
/// Kept above 6.0 so that [`TargetGrade::classify`] reports it as
/// unreachable; 6.0 itself would read as "a 6.0 is needed".
pub const OUT_OF_REACH: f64 = GRADE_MAX + 1.0;

/// How the app labels a solved target grade: at or below 1.0 reads as
/// "1.0 or better suffices", above 6.0 as "not achievable".
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetGrade {
    Secured,
    /// The grade needed, rounded to two decimals.
    Needed(f64),
    Unreachable,
}

impl TargetGrade {
    pub fn classify(required: f64) -> Self {
        if required <= GRADE_MIN {
            TargetGrade::Secured
        } else if required > GRADE_MAX {
            TargetGrade::Unreachable
        } else {
            TargetGrade::Needed(required.to_2_decimal())
        }
    }
}

/// `x` such that `(Σ value·weight + x·new_weight) / (Σ weight + new_weight) = target`.
fn solve_weighted_mean(existing: &WeightedSum, target: f64, new_weight: f64) -> f64 {
    (target * (existing.weight_sum + new_weight) - existing.value_sum) / new_weight
}

/// Value a hypothetical next grade of `new_weight` and `new_type` must have
/// for the subject's final average to become `target`.
///
/// The result is not clamped: callers tell "already secured" (≤ 1.0) and
/// "unreachable" (> 6.0) apart with [`TargetGrade::classify`]. Returns `None`
/// when `new_weight` is not positive.
pub fn grade_needed_for_target<'a>(
    grades: impl IntoIterator<Item = &'a Grade>,
    subject: &Subject,
    target: f64,
    new_weight: f64,
    new_type: GradeType,
) -> Option<f64> {
    if !(new_weight.is_finite() && new_weight > 0.0) {
        debug!("target grade for {} undefined, weight {new_weight}", subject.id);
        return None;
    }
    let tiers = Tiers::of(grades);
    let Some(weights) = subject.effective_tier_weights() else {
        return Some(solve_weighted_mean(&tiers.total(), target, new_weight));
    };

    let own_weight = weights.of(new_type);
    let other_weight = weights.of(new_type.other());
    let required = match tiers.get(new_type.other()).average().value() {
        // the new grade's tier alone makes up the final grade
        None => target,
        Some(other_average) if own_weight > 0.0 => {
            (target * (own_weight + other_weight) - other_average * other_weight) / own_weight
        }
        Some(other_average) => {
            let reached = other_average.to_2_decimal() <= target;
            debug!(
                "{new_type} carries no weight in {}, target {target} reached: {reached}",
                subject.id
            );
            return Some(if reached { GRADE_MIN } else { OUT_OF_REACH });
        }
    };
    Some(solve_weighted_mean(tiers.get(new_type), required, new_weight))
}

/// Outlook for the subject's own `target_grade`, if it has one.
pub fn target_outlook<'a>(
    grades: impl IntoIterator<Item = &'a Grade>,
    subject: &Subject,
    new_weight: f64,
    new_type: GradeType,
) -> Option<TargetGrade> {
    let target = subject.target_grade?;
    grade_needed_for_target(grades, subject, target, new_weight, new_type).map(TargetGrade::classify)
}
