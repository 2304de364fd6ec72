//! Error taxonomy surfaced by controllers and stores.
//!
//! `Validation` and `NotFound` are resolved locally and never reach the
//! network. `Network` and `Server` leave the collection at (or revert it to)
//! its last known-good value. `PersistenceWarning` is advisory only: the
//! in-memory state that triggered it is already correct.

use thiserror::Error;

/// Errors surfaced by list controllers and the resource client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
  /// Local pre-flight validation failed; no network call was made.
  #[error("validation failed: {}", .fields.join(", "))]
  Validation {
    /// Names of the required fields that were empty or blank.
    fields: Vec<String>,
  },

  /// No response from the backend: connection failure or timeout.
  #[error("network error: {0}")]
  Network(String),

  /// The backend answered with a non-success status.
  #[error("server error ({status}): {message}")]
  Server {
    status: u16,
    /// The backend's own message when it sent one, else a generic message.
    message: String,
  },

  /// The id is not present in the current collection. Defensive: optimistic
  /// removal can race with a stale click.
  #[error("no entity with id {id} in the current collection")]
  NotFound { id: String },
}

impl ResourceError {
  pub fn validation<I, S>(fields: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    ResourceError::Validation {
      fields: fields.into_iter().map(Into::into).collect(),
    }
  }

  pub fn not_found(id: impl Into<String>) -> Self {
    ResourceError::NotFound { id: id.into() }
  }

  /// True for errors that never reached the network layer.
  pub fn is_local(&self) -> bool {
    matches!(
      self,
      ResourceError::Validation { .. } | ResourceError::NotFound { .. }
    )
  }
}

/// Non-fatal warning from the comment side-store.
///
/// Raised when a write-through persistence attempt fails (storage quota,
/// serialization). The in-memory thread remains correct; only durability is
/// lost until the next successful write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to persist comment thread for {parent_id}: {reason}")]
pub struct PersistenceWarning {
  /// Id of the entity owning the thread that failed to persist.
  pub parent_id: String,
  pub reason: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validation_message_lists_fields() {
    let err = ResourceError::validation(["name", "status"]);
    assert_eq!(err.to_string(), "validation failed: name, status");
    assert!(err.is_local());
  }

  #[test]
  fn server_error_carries_backend_message() {
    let err = ResourceError::Server {
      status: 500,
      message: "index rebuild in progress".to_string(),
    };
    assert_eq!(
      err.to_string(),
      "server error (500): index rebuild in progress"
    );
    assert!(!err.is_local());
  }
}
