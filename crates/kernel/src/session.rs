//! Session readiness signal.
//!
//! Authentication lives in an external collaborator. The shell only needs to
//! know when an account becomes ready, which it tracks as a monotonically
//! increasing ready epoch: every ready signal is a new transition, sign-out
//! is not.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

/// The account the session collaborator reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    #[serde(default)]
    pub authorities: Vec<String>,
}

/// Current session as seen by the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub account: Option<Account>,
    /// Number of ready transitions so far (0 = never ready).
    pub ready_epoch: u64,
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        self.account.is_some() && self.ready_epoch > 0
    }
}

/// Shared handle on the session signal.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    tx: Arc<watch::Sender<SessionState>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Signal that `account` is ready. Returns the new ready epoch.
    pub fn mark_ready(&self, account: Account) -> u64 {
        let mut epoch = 0;
        self.tx.send_modify(|state| {
            state.ready_epoch += 1;
            state.account = Some(account);
            epoch = state.ready_epoch;
        });
        info!(epoch, "session ready");
        epoch
    }

    /// Signal sign-out. Not a ready transition.
    pub fn sign_out(&self) {
        self.tx.send_modify(|state| state.account = None);
        info!("session signed out");
    }

    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Watch session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            login: "admin".into(),
            authorities: vec!["ROLE_ADMIN".into()],
        }
    }

    #[test]
    fn starts_not_ready() {
        let tracker = SessionTracker::new();
        assert!(!tracker.current().is_ready());
        assert_eq!(tracker.current().ready_epoch, 0);
    }

    #[test]
    fn every_ready_signal_is_a_transition() {
        let tracker = SessionTracker::new();
        assert_eq!(tracker.mark_ready(account()), 1);
        assert_eq!(tracker.mark_ready(account()), 2);
        assert!(tracker.current().is_ready());
    }

    #[test]
    fn sign_out_keeps_epoch() {
        let tracker = SessionTracker::new();
        tracker.mark_ready(account());
        tracker.sign_out();
        let state = tracker.current();
        assert!(!state.is_ready());
        assert_eq!(state.ready_epoch, 1);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let tracker = SessionTracker::new();
        let mut rx = tracker.subscribe();
        tracker.mark_ready(account());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().ready_epoch, 1);
    }
}
