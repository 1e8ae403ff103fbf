use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use derive_more::{Deref, Display, Into};
use uuid::Uuid;

use crate::{BodyPart, DeleteError, ReadError, UpdateError};

#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    async fn read_workouts(&self) -> Result<Vec<WorkoutRecord>, ReadError>;
    async fn replace_workouts(&self, workouts: &[WorkoutRecord]) -> Result<(), UpdateError>;
    async fn delete_workouts(&self) -> Result<(), DeleteError>;
}

/// One logged exercise event.
///
/// `date` is the calendar day the workout is attributed to and is `None`
/// only for records whose persisted date could not be parsed. Such records
/// are excluded from day/week/month filters but remain visible in
/// [`group_by_day`](crate::group_by_day). Records created in-process always
/// carry a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutRecord {
    pub id: WorkoutID,
    pub date: Option<NaiveDate>,
    pub body_part: BodyPart,
    pub timestamp: DateTime<Utc>,
    pub sets: Sets,
}

impl WorkoutRecord {
    #[must_use]
    pub fn new(body_part: BodyPart, date: NaiveDate, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().into(),
            date: Some(date),
            body_part,
            timestamp,
            sets: Sets::default(),
        }
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(Uuid);

impl WorkoutID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for WorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Number of sets, at least 1.
#[derive(Debug, Display, Clone, Copy, Into, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sets(u32);

impl Sets {
    pub const FLOOR: Sets = Sets(1);

    pub fn new(value: u32) -> Result<Self, SetsError> {
        if value < 1 {
            return Err(SetsError::OutOfRange);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Decrementing at the floor is a no-op.
    #[must_use]
    pub fn decremented(self) -> Self {
        Self(self.0.saturating_sub(1).max(1))
    }
}

impl Default for Sets {
    fn default() -> Self {
        Self::FLOOR
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetsError {
    #[error("Sets must be 1 or more")]
    OutOfRange,
}
