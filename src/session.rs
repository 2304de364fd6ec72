//! Session context shared with controllers and stores.
//!
//! One explicit object carries the current user, role and auth token; it is
//! passed in at construction instead of being read from ambient globals.
//! Changes (login, logout, role switch) are pushed through a watch channel
//! so consumers observe them without polling.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Role of the signed-in user, used to gate mutating actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  #[default]
  Member,
  Viewer,
}

impl Role {
  /// Whether this role may create, update or delete entities.
  pub fn can_mutate(&self) -> bool {
    !matches!(self, Role::Viewer)
  }
}

/// Snapshot of the signed-in session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
  /// Current user id; empty when signed out.
  pub user_id: String,
  #[serde(default)]
  pub role: Role,
  /// Bearer token for the backend, when authenticated.
  #[serde(default)]
  pub token: Option<String>,
}

impl SessionContext {
  pub fn new(user_id: impl Into<String>, role: Role) -> Self {
    Self {
      user_id: user_id.into(),
      role,
      token: None,
    }
  }

  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  pub fn is_signed_in(&self) -> bool {
    !self.user_id.is_empty()
  }
}

/// Shared handle to the session, with pub/sub change notification.
///
/// Cloning is cheap; all clones observe the same session. `subscribe`
/// returns a receiver whose `changed()` resolves whenever a new context is
/// pushed.
#[derive(Debug, Clone)]
pub struct SessionHandle {
  tx: watch::Sender<SessionContext>,
}

impl SessionHandle {
  pub fn new(initial: SessionContext) -> Self {
    let (tx, _rx) = watch::channel(initial);
    Self { tx }
  }

  /// Current session snapshot.
  pub fn current(&self) -> SessionContext {
    self.tx.borrow().clone()
  }

  /// Replace the session and notify subscribers.
  pub fn set(&self, context: SessionContext) {
    // send_replace never fails even with zero receivers.
    self.tx.send_replace(context);
  }

  /// Clear the session back to signed-out and notify subscribers.
  pub fn sign_out(&self) {
    self.tx.send_replace(SessionContext::default());
  }

  /// Subscribe to session changes.
  pub fn subscribe(&self) -> watch::Receiver<SessionContext> {
    self.tx.subscribe()
  }
}

impl Default for SessionHandle {
  fn default() -> Self {
    Self::new(SessionContext::default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn subscribers_observe_pushed_changes() {
    let session = SessionHandle::default();
    let mut rx = session.subscribe();

    session.set(SessionContext::new("u-7", Role::Admin));

    rx.changed().await.expect("sender alive");
    assert_eq!(rx.borrow().user_id, "u-7");
    assert!(rx.borrow().role.can_mutate());
  }

  #[tokio::test]
  async fn sign_out_resets_to_default() {
    let session = SessionHandle::new(
      SessionContext::new("u-1", Role::Member).with_token("secret"),
    );
    session.sign_out();

    let current = session.current();
    assert!(!current.is_signed_in());
    assert_eq!(current.token, None);
  }

  #[test]
  fn viewer_cannot_mutate() {
    assert!(!Role::Viewer.can_mutate());
    assert!(Role::Member.can_mutate());
  }
}
