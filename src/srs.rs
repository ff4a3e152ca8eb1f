use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use itertools::Itertools;
use log::trace;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{NotenError, Result};

/// Outcome of a single flashcard review.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Good,
    Easy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsState {
    /// Days until the next review.
    pub interval: u32,
    pub ease_factor: f64,
    /// Successful reviews since the last "again".
    pub repetitions: u32,
    pub last_reviewed: DateTime<Utc>,
}

/// A term/definition pair. Cards without `srs` have never been reviewed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudyCard {
    pub id: String,
    pub term: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srs: Option<SrsState>,
}

impl StudyCard {
    pub fn new(id: impl Into<String>, term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
            definition: definition.into(),
            srs: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.srs.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Ease factor of a card on its first review.
    pub initial_ease: f64,
    /// Floor applied after every review.
    pub minimum_ease: f64,
    /// Added to the ease factor on "easy".
    pub easy_bonus: f64,
    /// Interval after the first successful review and after "again".
    pub first_interval: u32,
    pub second_interval: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            easy_bonus: 0.15,
            first_interval: 1,
            second_interval: 6,
        }
    }
}

/// The scheduling states a card would move to for each rating.
#[derive(Clone, Debug, PartialEq)]
pub struct NextStates {
    pub again: SrsState,
    pub good: SrsState,
    pub easy: SrsState,
}

/// Leveled spaced-repetition scheduler: fixed intervals for the first two
/// successful reviews, after that the interval grows by the ease factor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        let SchedulerConfig {
            initial_ease,
            minimum_ease,
            easy_bonus,
            first_interval,
            second_interval,
        } = config;
        let finite = [initial_ease, minimum_ease, easy_bonus]
            .iter()
            .all(|v| v.is_finite());
        if !finite
            || minimum_ease < 1.0
            || initial_ease < minimum_ease
            || easy_bonus < 0.0
            || first_interval < 1
            || second_interval < 1
        {
            return Err(NotenError::InvalidSchedulerConfig);
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// State after reviewing a card in `prior` state with `rating` at `now`.
    pub fn next_state(&self, prior: Option<&SrsState>, rating: Rating, now: DateTime<Utc>) -> SrsState {
        let config = &self.config;
        let (mut ease_factor, prior_interval, prior_repetitions) = match prior {
            Some(state) => (state.ease_factor, state.interval, state.repetitions),
            None => (config.initial_ease, 0, 0),
        };
        let (interval, repetitions) = match rating {
            Rating::Again => (config.first_interval, 0),
            Rating::Good | Rating::Easy => {
                let repetitions = prior_repetitions.saturating_add(1);
                let interval = match repetitions {
                    1 => config.first_interval,
                    2 => config.second_interval,
                    _ => (prior_interval as f64 * ease_factor).round() as u32,
                };
                (interval, repetitions)
            }
        };
        if rating == Rating::Easy {
            ease_factor += config.easy_bonus;
        }
        let ease_factor = ease_factor.max(config.minimum_ease);
        trace!(
            "{rating}: repetitions {prior_repetitions} -> {repetitions}, interval {prior_interval} -> {interval}, ease {ease_factor}"
        );
        SrsState {
            interval,
            ease_factor,
            repetitions,
            last_reviewed: now,
        }
    }

    /// Returns the reviewed card; `card` itself is left untouched.
    pub fn review(&self, card: &StudyCard, rating: Rating, now: DateTime<Utc>) -> StudyCard {
        StudyCard {
            srs: Some(self.next_state(card.srs.as_ref(), rating, now)),
            ..card.clone()
        }
    }

    pub fn next_states(&self, card: &StudyCard, now: DateTime<Utc>) -> NextStates {
        let prior = card.srs.as_ref();
        NextStates {
            again: self.next_state(prior, Rating::Again, now),
            good: self.next_state(prior, Rating::Good, now),
            easy: self.next_state(prior, Rating::Easy, now),
        }
    }

    /// Day on which the card becomes due, as seen in the time zone of `now`.
    /// Cards that were never reviewed are due today.
    pub fn due_date<Tz: TimeZone>(&self, card: &StudyCard, now: &DateTime<Tz>) -> NaiveDate {
        match &card.srs {
            None => now.date_naive(),
            Some(state) => state
                .last_reviewed
                .with_timezone(&now.timezone())
                .checked_add_days(Days::new(u64::from(state.interval)))
                .map_or(NaiveDate::MAX, |due| due.date_naive()),
        }
    }

    pub fn is_due<Tz: TimeZone>(&self, card: &StudyCard, now: &DateTime<Tz>) -> bool {
        self.due_date(card, now) <= now.date_naive()
    }

    /// Cards due today or earlier, new cards first, then by due date.
    pub fn due_cards<'a, Tz: TimeZone>(
        &self,
        cards: &'a [StudyCard],
        now: &DateTime<Tz>,
    ) -> Vec<&'a StudyCard> {
        cards
            .iter()
            .filter(|card| self.is_due(card, now))
            .sorted_by_key(|card| (!card.is_new(), self.due_date(card, now)))
            .collect()
    }
}
