//! In-memory roster of child profiles and finished sessions.
//!
//! The roster is owned by a single worker thread; every read or mutation is
//! shipped to it as a closure and answered over a oneshot channel, so callers
//! share a cheap cloneable handle instead of a global.

use std::{
    sync::{mpsc, Arc, Mutex, PoisonError},
    thread::{self, JoinHandle},
};

use chrono::NaiveDate;
use log::{debug, error, info};
use tokio::sync::oneshot;

use crate::avatar::AvatarGenerator;
use crate::error::{FocusError, FocusResult};
use crate::models::{ChildProfile, FocusSession};

mod children;
mod sessions;

#[derive(Debug, Default)]
pub(crate) struct Roster {
    children: Vec<ChildProfile>,
    sessions: Vec<FocusSession>,
    selected: Option<String>,
}

impl Roster {
    fn child(&self, id: &str) -> Option<&ChildProfile> {
        self.children.iter().find(|child| child.id == id)
    }

    fn demo(avatar: &dyn AvatarGenerator) -> Self {
        let child = |id: &str, name: &str, age: u8, seed: &str| ChildProfile {
            id: id.into(),
            name: name.into(),
            age,
            avatar: avatar.render(seed),
            avatar_seed: seed.into(),
        };
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);

        Self {
            children: vec![child("1", "Emma", 8, "emma"), child("2", "Liam", 9, "liam")],
            sessions: vec![
                FocusSession::new("1", "1", date(2023, 6, 1), 25, 82),
                FocusSession::new("2", "1", date(2023, 6, 2), 30, 75),
                FocusSession::new("3", "2", date(2023, 6, 1), 20, 65),
            ],
            selected: None,
        }
    }
}

type StoreTask = Box<dyn FnOnce(&mut Roster) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct StoreInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StoreInner {
    /// Idempotent: only the first call owns the worker handle.
    fn close(&self) -> FocusResult<()> {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(worker) = worker else {
            return Ok(());
        };

        if self.sender.send(StoreCommand::Shutdown).is_err() {
            debug!("Profile store thread already stopped");
        }
        worker
            .join()
            .map_err(|_| FocusError::StoreUnavailable("store thread panicked".into()))
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            error!("Profile store did not shut down cleanly: {err}");
        }
    }
}

#[derive(Clone)]
pub struct ProfileStore {
    inner: Arc<StoreInner>,
}

impl ProfileStore {
    pub fn new() -> FocusResult<Self> {
        Self::spawn(Roster::default())
    }

    /// Seeds the two sample children and their three historic sessions.
    pub fn with_demo_data(avatar: &dyn AvatarGenerator) -> FocusResult<Self> {
        Self::spawn(Roster::demo(avatar))
    }

    fn spawn(mut roster: Roster) -> FocusResult<Self> {
        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();

        let worker = thread::Builder::new()
            .name("focusboost-store".into())
            .spawn(move || {
                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => task(&mut roster),
                        StoreCommand::Shutdown => break,
                    }
                }
                info!("Profile store thread shutting down");
            })
            .map_err(|err| FocusError::StoreUnavailable(format!("failed to spawn worker: {err}")))?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    /// Stops the worker thread for every clone of this handle. Later
    /// operations fail with `StoreUnavailable`.
    pub fn close(&self) -> FocusResult<()> {
        self.inner.close()?;
        info!("Profile store closed");
        Ok(())
    }

    pub(crate) async fn execute<F, T>(&self, task: F) -> FocusResult<T>
    where
        F: FnOnce(&mut Roster) -> FocusResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |roster| {
            let result = task(roster);
            if reply_tx.send(result).is_err() {
                error!("Store caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|err| FocusError::StoreUnavailable(format!("send failed: {err}")))?;

        reply_rx
            .await
            .map_err(|_| FocusError::StoreUnavailable("store thread terminated".into()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::MonogramAvatar;

    #[tokio::test]
    async fn closed_store_refuses_work_from_every_clone() {
        let store = ProfileStore::with_demo_data(&MonogramAvatar).unwrap();
        let other = store.clone();
        assert_eq!(other.list_children().await.unwrap().len(), 2);

        store.close().unwrap();
        store.close().unwrap();

        assert!(matches!(
            other.list_sessions().await.unwrap_err(),
            FocusError::StoreUnavailable(_)
        ));
    }
}
