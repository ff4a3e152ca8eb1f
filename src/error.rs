use snafu::Snafu;

#[derive(Snafu, Debug, PartialEq)]
pub enum NotenError {
    /// A grade value outside of 1.0..=6.0.
    InvalidGrade,
    /// A grade weight that is not a positive, finite number.
    InvalidWeight,
    /// Written/oral tier weights that are negative or not finite.
    InvalidTierWeights,
    /// Main/minor subject weights that are negative or not finite.
    InvalidSettings,
    InvalidSchedulerConfig,
    EmptyName,
}

pub type Result<T, E = NotenError> = std::result::Result<T, E>;
