use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use setlog_domain as domain;

/// In-memory implementation of the workout repository.
///
/// Stands in for the embedded database in tests of the layers above; it can
/// be switched into an unavailable mode to exercise failure paths, and it
/// counts replace calls so tests can assert on flush behavior.
#[derive(Clone)]
pub struct InMemoryStore {
    workouts: Arc<Mutex<Vec<domain::WorkoutRecord>>>,
    available: Arc<AtomicBool>,
    replace_calls: Arc<AtomicUsize>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            workouts: Arc::new(Mutex::new(vec![])),
            available: Arc::new(AtomicBool::new(true)),
            replace_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn with_workouts(workouts: Vec<domain::WorkoutRecord>) -> Self {
        let store = Self::new();
        *store.workouts.lock().unwrap() = workouts;
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    #[must_use]
    pub fn stored(&self) -> Vec<domain::WorkoutRecord> {
        self.workouts.lock().unwrap().clone()
    }

    #[must_use]
    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::Relaxed)
    }

    fn check_available<E: From<domain::StorageError>>(&self) -> Result<(), E> {
        if self.available.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(domain::StorageError::Unavailable("store is unavailable".to_string()).into())
        }
    }
}

#[async_trait]
impl domain::WorkoutRepository for InMemoryStore {
    async fn read_workouts(&self) -> Result<Vec<domain::WorkoutRecord>, domain::ReadError> {
        self.check_available::<domain::ReadError>()?;
        Ok(self.workouts.lock().unwrap().clone())
    }

    async fn replace_workouts(
        &self,
        workouts: &[domain::WorkoutRecord],
    ) -> Result<(), domain::UpdateError> {
        self.check_available::<domain::UpdateError>()?;
        self.replace_calls.fetch_add(1, Ordering::Relaxed);
        *self.workouts.lock().unwrap() = workouts.to_vec();
        Ok(())
    }

    async fn delete_workouts(&self) -> Result<(), domain::DeleteError> {
        self.check_available::<domain::DeleteError>()?;
        self.workouts.lock().unwrap().clear();
        Ok(())
    }
}
