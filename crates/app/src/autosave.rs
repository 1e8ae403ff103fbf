use chrono::{DateTime, Utc};
use log::debug;
use tokio::{
    select,
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use setlog_domain as domain;

use crate::AutosaveConfig;

/// Decides when the in-memory collection is flushed to the store.
///
/// Mutations are debounced: a flush runs once activity has settled for the
/// configured quiet window, and every new mutation restarts that window.
/// Removals use a shorter window. A periodic fallback timer flushes changes
/// that have been pending for too long in case the debounce never fires.
/// The task starts clean, so constructing it after loading persisted state
/// does not produce a startup write.
pub struct Autosave {
    messages: mpsc::UnboundedSender<Message>,
    acks: watch::Receiver<Option<SaveAck>>,
    task: JoinHandle<()>,
}

/// Published after a removal-triggered flush has completed. Routine
/// autosaves are silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveAck {
    pub saved_at: DateTime<Utc>,
    pub records: usize,
}

enum Message {
    Changed(Vec<domain::WorkoutRecord>),
    Removed(Vec<domain::WorkoutRecord>),
    Cancel,
    Shutdown,
}

struct Pending {
    deadline: Instant,
    snapshot: Vec<domain::WorkoutRecord>,
    acknowledge: bool,
}

impl Autosave {
    pub fn spawn<R>(service: domain::Service<R>, config: AutosaveConfig) -> Self
    where
        R: domain::WorkoutRepository + 'static,
    {
        let (messages, receiver) = mpsc::unbounded_channel();
        let (ack_sender, acks) = watch::channel(None);
        let task = tokio::spawn(run(service, config, receiver, ack_sender));
        Self {
            messages,
            acks,
            task,
        }
    }

    /// Signal a routine mutation (add/increment/decrement).
    pub fn changed(&self, snapshot: Vec<domain::WorkoutRecord>) {
        let _ = self.messages.send(Message::Changed(snapshot));
    }

    /// Signal a record removal, flushed promptly and acknowledged.
    pub fn removed(&self, snapshot: Vec<domain::WorkoutRecord>) {
        let _ = self.messages.send(Message::Removed(snapshot));
    }

    /// Discard any pending flush cycle.
    pub fn cancel_pending(&self) {
        let _ = self.messages.send(Message::Cancel);
    }

    #[must_use]
    pub fn acks(&self) -> watch::Receiver<Option<SaveAck>> {
        self.acks.clone()
    }

    /// End the task, flushing pending changes first.
    pub async fn shutdown(self) {
        let _ = self.messages.send(Message::Shutdown);
        let _ = self.task.await;
    }
}

async fn run<R>(
    service: domain::Service<R>,
    config: AutosaveConfig,
    mut receiver: mpsc::UnboundedReceiver<Message>,
    ack_sender: watch::Sender<Option<SaveAck>>,
) where
    R: domain::WorkoutRepository,
{
    let mut pending: Option<Pending> = None;
    let mut last_flush = Instant::now();
    let mut ticker = time::interval(config.fallback_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let deadline = pending.as_ref().map(|p| p.deadline);
        select! {
            message = receiver.recv() => match message {
                Some(Message::Changed(snapshot)) => {
                    // A removal ack pending from an earlier message in the
                    // same cycle survives the debounce restart.
                    let acknowledge = pending.as_ref().is_some_and(|p| p.acknowledge);
                    pending = Some(Pending {
                        deadline: Instant::now() + config.debounce_window,
                        snapshot,
                        acknowledge,
                    });
                }
                Some(Message::Removed(snapshot)) => {
                    pending = Some(Pending {
                        deadline: Instant::now() + config.removal_window,
                        snapshot,
                        acknowledge: true,
                    });
                }
                Some(Message::Cancel) => {
                    pending = None;
                }
                Some(Message::Shutdown) | None => {
                    break;
                }
            },
            () = async { time::sleep_until(deadline.unwrap_or_else(Instant::now)).await },
                if deadline.is_some() =>
            {
                if let Some(pending) = pending.take() {
                    flush(&service, &pending, &ack_sender).await;
                    last_flush = Instant::now();
                }
            }
            _ = ticker.tick() => {
                if pending.is_some() && last_flush.elapsed() >= config.fallback_threshold {
                    debug!("flushing changes pending for too long");
                    if let Some(pending) = pending.take() {
                        flush(&service, &pending, &ack_sender).await;
                        last_flush = Instant::now();
                    }
                }
            }
        }
    }

    if let Some(pending) = pending.take() {
        flush(&service, &pending, &ack_sender).await;
    }
}

async fn flush<R>(
    service: &domain::Service<R>,
    pending: &Pending,
    ack_sender: &watch::Sender<Option<SaveAck>>,
) where
    R: domain::WorkoutRepository,
{
    debug!("flushing {} workouts", pending.snapshot.len());
    if service.store_workouts(&pending.snapshot).await.is_ok() && pending.acknowledge {
        let _ = ack_sender.send(Some(SaveAck {
            saved_at: Utc::now(),
            records: pending.snapshot.len(),
        }));
    }
}
