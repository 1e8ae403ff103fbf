use chrono::{Local, Utc};
use tokio::sync::watch;

use setlog_domain as domain;

use crate::{Autosave, AutosaveConfig, SaveAck};

/// Single owner of the in-memory workout collection.
///
/// All mutations go through this type; every other component works on
/// read-only snapshots. Mutations are synchronous against the in-memory
/// state, with persistence handled fire-and-forget by the autosave
/// scheduler. The scheduler receives a snapshot per mutation, so a flush
/// always writes a fully-old or fully-new collection, never a partially
/// mutated one.
pub struct Controller<R>
where
    R: domain::WorkoutRepository + Clone + 'static,
{
    service: domain::Service<R>,
    workouts: Vec<domain::WorkoutRecord>,
    autosave: Autosave,
}

impl<R> Controller<R>
where
    R: domain::WorkoutRepository + Clone + 'static,
{
    /// Load the persisted collection and start the autosave scheduler.
    ///
    /// A failure to load is treated as "no data"; startup never writes to
    /// the store.
    pub async fn init(repository: R, config: AutosaveConfig) -> Self {
        let service = domain::Service::new(repository);
        let workouts = service.get_workouts().await;
        let autosave = Autosave::spawn(service.clone(), config);
        Self {
            service,
            workouts,
            autosave,
        }
    }

    #[must_use]
    pub fn workouts(&self) -> &[domain::WorkoutRecord] {
        &self.workouts
    }

    pub fn add_workout(&mut self, body_part: domain::BodyPart) -> domain::WorkoutID {
        let workout =
            domain::WorkoutRecord::new(body_part, Local::now().date_naive(), Utc::now());
        let id = workout.id;
        self.workouts.push(workout);
        self.autosave.changed(self.workouts.clone());
        id
    }

    pub fn increment_sets(&mut self, id: domain::WorkoutID) {
        self.update_sets(id, domain::Sets::incremented);
    }

    pub fn decrement_sets(&mut self, id: domain::WorkoutID) {
        self.update_sets(id, domain::Sets::decremented);
    }

    fn update_sets(&mut self, id: domain::WorkoutID, update: impl Fn(domain::Sets) -> domain::Sets) {
        let Some(workout) = self.workouts.iter_mut().find(|w| w.id == id) else {
            return;
        };
        let sets = update(workout.sets);
        if sets == workout.sets {
            return;
        }
        workout.sets = sets;
        self.autosave.changed(self.workouts.clone());
    }

    /// Remove a record and have it flushed promptly, so closing the app
    /// right afterwards cannot resurrect it.
    pub fn remove_workout(&mut self, id: domain::WorkoutID) {
        let count = self.workouts.len();
        self.workouts.retain(|w| w.id != id);
        if self.workouts.len() < count {
            self.autosave.removed(self.workouts.clone());
        }
    }

    /// Empty the collection and clear the store immediately, bypassing the
    /// debounce path. This is the one operation whose failure is surfaced
    /// to the caller.
    pub async fn reset_all(&mut self) -> Result<(), domain::DeleteError> {
        self.workouts.clear();
        self.autosave.cancel_pending();
        self.service.clear_workouts().await
    }

    /// Latest acknowledgment of a removal-triggered save.
    #[must_use]
    pub fn save_acks(&self) -> watch::Receiver<Option<SaveAck>> {
        self.autosave.acks()
    }

    /// Tear down the autosave scheduler, flushing pending changes.
    pub async fn shutdown(self) {
        self.autosave.shutdown().await;
    }
}
