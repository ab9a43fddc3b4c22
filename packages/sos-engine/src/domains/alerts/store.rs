//! In-process registry of alert sessions.
//!
//! Every write to a session goes through [`SessionCell::update`], which holds
//! the session mutex for the duration of the closure. Dispatcher workers and
//! acknowledgement callbacks share that path, so terminal target states are
//! never lost to a concurrent writer.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify, RwLock};

use super::models::{AlertSession, SessionStatus};
use crate::common::SessionId;

pub struct SessionCell {
    id: SessionId,
    session: Mutex<AlertSession>,
    /// Signalled whenever every target has reached a terminal state.
    settled: Notify,
    status: watch::Sender<SessionStatus>,
}

impl SessionCell {
    pub fn new(session: AlertSession) -> Self {
        let (status, _) = watch::channel(session.status);
        Self {
            id: session.id,
            session: Mutex::new(session),
            settled: Notify::new(),
            status,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Mutate the session under its lock, then publish status changes and wake
    /// the dispatcher if all targets are terminal.
    pub async fn update<R>(&self, f: impl FnOnce(&mut AlertSession) -> R) -> R {
        let mut session = self.session.lock().await;
        let result = f(&mut session);

        if session.all_targets_terminal() {
            self.settled.notify_one();
        }
        let status = session.status;
        self.status.send_if_modified(|current| {
            if *current != status {
                *current = status;
                true
            } else {
                false
            }
        });

        result
    }

    pub async fn snapshot(&self) -> AlertSession {
        self.session.lock().await.clone()
    }

    pub async fn settled(&self) {
        self.settled.notified().await
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<SessionCell>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: AlertSession) -> Arc<SessionCell> {
        let cell = Arc::new(SessionCell::new(session));
        self.sessions.write().await.insert(cell.id(), cell.clone());
        cell
    }

    pub async fn get(&self, id: SessionId) -> Option<Arc<SessionCell>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
