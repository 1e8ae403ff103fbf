#![allow(clippy::missing_errors_doc)]

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::warn;
use rusqlite::Connection;
use uuid::Uuid;

use setlog_domain as domain;

/// Embedded per-device store. Each workout is persisted as one JSON document
/// keyed by its record id.
#[derive(Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, domain::StorageError> {
        Self::initialize(Connection::open(path).map_err(storage_error)?)
    }

    pub fn open_in_memory() -> Result<Self, domain::StorageError> {
        Self::initialize(Connection::open_in_memory().map_err(storage_error)?)
    }

    fn initialize(connection: Connection) -> Result<Self, domain::StorageError> {
        connection
            .execute(
                "CREATE TABLE IF NOT EXISTS workouts (
                    id TEXT PRIMARY KEY,
                    record TEXT NOT NULL
                )",
                [],
            )
            .map_err(storage_error)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, domain::StorageError> {
        self.connection
            .lock()
            .map_err(|_| domain::StorageError::Unavailable("database handle poisoned".to_string()))
    }
}

#[async_trait]
impl domain::WorkoutRepository for SqliteStore {
    async fn read_workouts(&self) -> Result<Vec<domain::WorkoutRecord>, domain::ReadError> {
        let connection = self.lock()?;
        let mut statement = connection
            .prepare("SELECT record FROM workouts ORDER BY rowid")
            .map_err(storage_error)?;
        let rows = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(storage_error)?;

        let mut workouts = vec![];
        for row in rows {
            let record = row.map_err(storage_error)?;
            match serde_json::from_str::<Workout>(&record) {
                Ok(workout) => match domain::WorkoutRecord::try_from(workout) {
                    Ok(workout) => workouts.push(workout),
                    Err(err) => warn!("skipping workout record: {err}"),
                },
                Err(err) => warn!("skipping undecodable workout record: {err}"),
            }
        }
        Ok(workouts)
    }

    async fn replace_workouts(
        &self,
        workouts: &[domain::WorkoutRecord],
    ) -> Result<(), domain::UpdateError> {
        let mut connection = self.lock()?;
        let transaction = connection.transaction().map_err(storage_error)?;
        // Clear before insert, so an interrupted save can never leave a
        // superset of stale and new records.
        transaction
            .execute("DELETE FROM workouts", [])
            .map_err(storage_error)?;
        for workout in workouts {
            let record = serde_json::to_string(&Workout::from(workout))
                .map_err(|err| domain::StorageError::Other(Box::new(err)))?;
            transaction
                .execute(
                    "INSERT INTO workouts (id, record) VALUES (?1, ?2)",
                    rusqlite::params![workout.id.to_string(), record],
                )
                .map_err(storage_error)?;
        }
        transaction.commit().map_err(storage_error)?;
        Ok(())
    }

    async fn delete_workouts(&self) -> Result<(), domain::DeleteError> {
        self.lock()?
            .execute("DELETE FROM workouts", [])
            .map_err(storage_error)?;
        Ok(())
    }
}

fn storage_error(err: rusqlite::Error) -> domain::StorageError {
    domain::StorageError::Other(Box::new(err))
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    pub id: String,
    pub date: String,
    #[serde(rename = "bodyPart")]
    pub body_part: BodyPartRef,
    pub timestamp: String,
    pub sets: Option<u32>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BodyPartRef {
    pub name: String,
    pub icon: String,
}

impl From<&domain::WorkoutRecord> for Workout {
    fn from(value: &domain::WorkoutRecord) -> Self {
        Self {
            id: value.id.to_string(),
            date: value.date.map(|d| d.to_string()).unwrap_or_default(),
            body_part: BodyPartRef {
                name: value.body_part.name().to_string(),
                icon: value.body_part.icon().to_string(),
            },
            timestamp: value.timestamp.to_rfc3339(),
            sets: Some(value.sets.into()),
        }
    }
}

impl TryFrom<Workout> for domain::WorkoutRecord {
    type Error = WorkoutError;

    fn try_from(value: Workout) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| WorkoutError::InvalidID(value.id.clone()))?
            .into();
        let body_part = domain::BodyPart::try_from(value.body_part.name.as_str())
            .map_err(|_| WorkoutError::UnknownBodyPart(value.body_part.name.clone()))?;
        let date = match value.date.parse::<NaiveDate>() {
            Ok(date) => Some(date),
            Err(_) => {
                warn!("unparseable date {:?} on workout {id:?}", value.date);
                None
            }
        };
        let timestamp = match DateTime::parse_from_rfc3339(&value.timestamp) {
            Ok(timestamp) => timestamp.with_timezone(&Utc),
            Err(_) => {
                warn!(
                    "unparseable timestamp {:?} on workout {id:?}",
                    value.timestamp
                );
                date.map_or(DateTime::UNIX_EPOCH, |d| {
                    d.and_time(NaiveTime::MIN).and_utc()
                })
            }
        };
        Ok(Self {
            id,
            date,
            body_part,
            timestamp,
            sets: domain::Sets::new(value.sets.unwrap_or(1)).unwrap_or_default(),
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WorkoutError {
    #[error("invalid workout id: {0}")]
    InvalidID(String),
    #[error("unknown muscle group: {0}")]
    UnknownBodyPart(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use setlog_domain::WorkoutRepository;

    use super::*;

    fn workout(id: u128, day: (i32, u32, u32), body_part: domain::BodyPart, sets: u32) -> domain::WorkoutRecord {
        let date = NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap();
        domain::WorkoutRecord {
            id: id.into(),
            date: Some(date),
            body_part,
            timestamp: date.and_hms_opt(17, 0, 0).unwrap().and_utc(),
            sets: domain::Sets::new(sets).unwrap(),
        }
    }

    fn by_id(mut workouts: Vec<domain::WorkoutRecord>) -> Vec<domain::WorkoutRecord> {
        workouts.sort_by_key(|w| w.id);
        workouts
    }

    #[tokio::test]
    async fn test_replace_and_read_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let workouts = vec![
            workout(1, (2020, 2, 2), domain::BodyPart::Chest, 3),
            workout(2, (2020, 2, 3), domain::BodyPart::Legs, 1),
        ];

        store.replace_workouts(&workouts).await.unwrap();

        assert_eq!(by_id(store.read_workouts().await.unwrap()), by_id(workouts));
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_snapshot() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = vec![
            workout(1, (2020, 2, 2), domain::BodyPart::Chest, 3),
            workout(2, (2020, 2, 3), domain::BodyPart::Legs, 1),
        ];
        let second = vec![workout(3, (2020, 2, 4), domain::BodyPart::Abs, 2)];

        store.replace_workouts(&first).await.unwrap();
        store.replace_workouts(&second).await.unwrap();

        assert_eq!(store.read_workouts().await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_replace_with_empty_propagates_deletion() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .replace_workouts(&[workout(1, (2020, 2, 2), domain::BodyPart::Chest, 3)])
            .await
            .unwrap();

        store.replace_workouts(&[]).await.unwrap();

        assert_eq!(store.read_workouts().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_delete_workouts() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .replace_workouts(&[workout(1, (2020, 2, 2), domain::BodyPart::Chest, 3)])
            .await
            .unwrap();

        store.delete_workouts().await.unwrap();

        assert_eq!(store.read_workouts().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_read_from_uninitialized_store() {
        let store = SqliteStore::open_in_memory().unwrap();

        assert_eq!(store.read_workouts().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let workouts = vec![workout(1, (2020, 2, 2), domain::BodyPart::Biceps, 2)];

        {
            let store = SqliteStore::open(file.path()).unwrap();
            store.replace_workouts(&workouts).await.unwrap();
        }

        let store = SqliteStore::open(file.path()).unwrap();
        assert_eq!(store.read_workouts().await.unwrap(), workouts);
    }

    #[tokio::test]
    async fn test_read_skips_undecodable_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        let workouts = vec![workout(1, (2020, 2, 2), domain::BodyPart::Chest, 3)];
        store.replace_workouts(&workouts).await.unwrap();
        {
            let connection = store.lock().unwrap();
            connection
                .execute(
                    "INSERT INTO workouts (id, record) VALUES ('garbage', 'not json')",
                    [],
                )
                .unwrap();
            connection
                .execute(
                    "INSERT INTO workouts (id, record) VALUES ('unknown', ?1)",
                    [r#"{"id":"00000000-0000-0000-0000-000000000002","date":"2020-02-02","bodyPart":{"name":"Neck","icon":"neck"},"timestamp":"2020-02-02T17:00:00+00:00","sets":1}"#],
                )
                .unwrap();
        }

        assert_eq!(store.read_workouts().await.unwrap(), workouts);
    }

    #[tokio::test]
    async fn test_read_keeps_records_with_unparseable_date() {
        let store = SqliteStore::open_in_memory().unwrap();
        {
            let connection = store.lock().unwrap();
            connection
                .execute(
                    "INSERT INTO workouts (id, record) VALUES ('00000000-0000-0000-0000-000000000001', ?1)",
                    [r#"{"id":"00000000-0000-0000-0000-000000000001","date":"not a date","bodyPart":{"name":"Legs","icon":"legs"},"timestamp":"2020-02-02T17:00:00+00:00","sets":2}"#],
                )
                .unwrap();
        }

        let workouts = store.read_workouts().await.unwrap();

        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].date, None);
        assert_eq!(workouts[0].body_part, domain::BodyPart::Legs);
        assert_eq!(workouts[0].sets, domain::Sets::new(2).unwrap());
    }

    #[rstest]
    #[case::absent_sets(None, 1)]
    #[case::zero_sets(Some(0), 1)]
    #[case::present_sets(Some(4), 4)]
    fn test_workout_sets_default_to_floor(#[case] sets: Option<u32>, #[case] expected: u32) {
        let workout = Workout {
            id: "00000000-0000-0000-0000-000000000001".to_string(),
            date: "2020-02-02".to_string(),
            body_part: BodyPartRef {
                name: "Chest".to_string(),
                icon: "chest".to_string(),
            },
            timestamp: "2020-02-02T17:00:00+00:00".to_string(),
            sets,
        };

        let record = domain::WorkoutRecord::try_from(workout).unwrap();

        assert_eq!(record.sets, domain::Sets::new(expected).unwrap());
    }

    #[test]
    fn test_workout_unparseable_timestamp_falls_back_to_midnight() {
        let workout = Workout {
            id: "00000000-0000-0000-0000-000000000001".to_string(),
            date: "2020-02-02".to_string(),
            body_part: BodyPartRef {
                name: "Chest".to_string(),
                icon: "chest".to_string(),
            },
            timestamp: "later".to_string(),
            sets: Some(1),
        };

        let record = domain::WorkoutRecord::try_from(workout).unwrap();

        assert_eq!(
            record.timestamp,
            NaiveDate::from_ymd_opt(2020, 2, 2)
                .unwrap()
                .and_time(NaiveTime::MIN)
                .and_utc()
        );
    }

    #[test]
    fn test_workout_invalid_id() {
        let workout = Workout {
            id: "42".to_string(),
            date: "2020-02-02".to_string(),
            body_part: BodyPartRef {
                name: "Chest".to_string(),
                icon: "chest".to_string(),
            },
            timestamp: "2020-02-02T17:00:00+00:00".to_string(),
            sets: Some(1),
        };

        assert_eq!(
            domain::WorkoutRecord::try_from(workout),
            Err(WorkoutError::InvalidID("42".to_string()))
        );
    }
}
