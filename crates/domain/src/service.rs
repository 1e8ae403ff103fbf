use log::error;

use crate::{DeleteError, UpdateError, WorkoutRecord, WorkoutRepository};

/// Repository wrapper applying the persistence failure policy: failures are
/// logged at the boundary and never propagate as panics. Reading treats any
/// failure as "no data"; clearing is the one path whose error reaches the
/// caller, since silently keeping data the user asked to delete would be
/// misleading.
#[derive(Clone)]
pub struct Service<R> {
    repository: R,
}

macro_rules! log_on_error {
    ($func:expr, $action:literal) => {{
        let result = $func.await;
        if let Err(ref err) = result {
            error!("failed to {} workouts: {err}", $action);
        }
        result
    }};
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: WorkoutRepository> Service<R> {
    pub async fn get_workouts(&self) -> Vec<WorkoutRecord> {
        log_on_error!(self.repository.read_workouts(), "read").unwrap_or_default()
    }

    pub async fn store_workouts(&self, workouts: &[WorkoutRecord]) -> Result<(), UpdateError> {
        log_on_error!(self.repository.replace_workouts(workouts), "store")
    }

    pub async fn clear_workouts(&self) -> Result<(), DeleteError> {
        log_on_error!(self.repository.delete_workouts(), "clear")
    }
}
