//! Comment store: thread mutation and write-through persistence.

use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::error::{PersistenceWarning, ResourceError};

use super::side_store::SideStore;
use super::thread::{find_in, find_in_mut, Comment};

/// Nested discussion threads attached to entities, persisted write-through
/// to a durable local side-store.
///
/// Threads are loaded lazily per parent entity and written back in full on
/// every mutation; comment volume is small enough that durability matters
/// more than write amortization. A failed write degrades to a
/// [`PersistenceWarning`] while the in-memory thread stays correct.
pub struct CommentStore<S: SideStore> {
  store: S,
  threads: HashMap<String, Vec<Comment>>,
  loaded: HashSet<String>,
  next_id: u64,
  warning: Option<PersistenceWarning>,
}

impl<S: SideStore> CommentStore<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      threads: HashMap::new(),
      loaded: HashSet::new(),
      next_id: 1,
      warning: None,
    }
  }

  /// Add a comment to the thread of `parent_id`.
  ///
  /// With `reply_to`, the new comment is appended to the replies of that
  /// comment, located by depth-first search; otherwise it lands at the top
  /// level. Blank text is rejected locally; a missing reply target is
  /// `NotFound`.
  pub fn add_comment(
    &mut self,
    parent_id: &str,
    text: &str,
    author: &str,
    reply_to: Option<&str>,
  ) -> Result<String, ResourceError> {
    if text.trim().is_empty() {
      return Err(ResourceError::validation(["text"]));
    }

    self.ensure_loaded(parent_id);

    let id = format!("c{}", self.next_id);
    self.next_id += 1;
    let comment = Comment::new(id.clone(), text.to_string(), author.to_string());

    let thread = self.threads.entry(parent_id.to_string()).or_default();
    match reply_to {
      Some(target) => match find_in_mut(thread, target) {
        Some(parent_comment) => parent_comment.replies.push(comment),
        None => return Err(ResourceError::not_found(target)),
      },
      None => thread.push(comment),
    }

    self.persist(parent_id);
    Ok(id)
  }

  /// Toggle `user_id`'s like on a comment.
  ///
  /// Returns whether the comment is liked by the user afterwards, or `None`
  /// if the comment no longer exists (vanished comments are a no-op for
  /// callers). Calling twice with the same user restores the original state.
  pub fn toggle_like(
    &mut self,
    parent_id: &str,
    comment_id: &str,
    user_id: &str,
  ) -> Option<bool> {
    self.ensure_loaded(parent_id);

    let thread = self.threads.get_mut(parent_id)?;
    let comment = find_in_mut(thread, comment_id)?;

    let now_liked = if comment.liked_by.contains(user_id) {
      comment.liked_by.remove(user_id);
      false
    } else {
      comment.liked_by.insert(user_id.to_string());
      true
    };
    // The count is derived, never trusted separately.
    comment.reconcile_likes();

    self.persist(parent_id);
    Some(now_liked)
  }

  /// Locate a comment anywhere in the thread of `parent_id`.
  pub fn find_by_id(&mut self, parent_id: &str, comment_id: &str) -> Option<&Comment> {
    self.ensure_loaded(parent_id);
    find_in(self.threads.get(parent_id)?, comment_id)
  }

  /// The top-level comments for `parent_id`, loading from storage on first
  /// access.
  pub fn thread(&mut self, parent_id: &str) -> &[Comment] {
    self.ensure_loaded(parent_id);
    self.threads.get(parent_id).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Take the most recent persistence warning, if any. Advisory only.
  pub fn take_warning(&mut self) -> Option<PersistenceWarning> {
    self.warning.take()
  }

  fn ensure_loaded(&mut self, parent_id: &str) {
    if self.loaded.contains(parent_id) {
      return;
    }
    self.loaded.insert(parent_id.to_string());

    let thread = match self.store.read(&storage_key(parent_id)) {
      Ok(Some(value)) => match serde_json::from_value::<Vec<Comment>>(value) {
        Ok(mut thread) => {
          // Persisted counts may have drifted; membership is authoritative.
          for comment in &mut thread {
            comment.reconcile_likes();
          }
          thread
        }
        Err(e) => {
          warn!(parent_id, error = %e, "stored comment thread is unreadable, starting empty");
          Vec::new()
        }
      },
      Ok(None) => Vec::new(),
      Err(e) => {
        warn!(parent_id, error = %e, "failed to read comment thread, starting empty");
        self.warning = Some(PersistenceWarning {
          parent_id: parent_id.to_string(),
          reason: e.to_string(),
        });
        Vec::new()
      }
    };

    self.seed_next_id(&thread);
    self.threads.insert(parent_id.to_string(), thread);
  }

  /// Keep generated ids ahead of everything already persisted.
  fn seed_next_id(&mut self, thread: &[Comment]) {
    fn max_id(comments: &[Comment]) -> u64 {
      comments
        .iter()
        .map(|c| {
          let own = c
            .id
            .strip_prefix('c')
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0);
          own.max(max_id(&c.replies))
        })
        .max()
        .unwrap_or(0)
    }

    self.next_id = self.next_id.max(max_id(thread) + 1);
  }

  fn persist(&mut self, parent_id: &str) {
    let thread = self.threads.get(parent_id).map(Vec::as_slice).unwrap_or(&[]);
    let value = match serde_json::to_value(thread) {
      Ok(v) => v,
      Err(e) => {
        warn!(parent_id, error = %e, "failed to serialize comment thread");
        self.warning = Some(PersistenceWarning {
          parent_id: parent_id.to_string(),
          reason: e.to_string(),
        });
        return;
      }
    };

    if let Err(e) = self.store.write(&storage_key(parent_id), &value) {
      warn!(parent_id, error = %e, "failed to persist comment thread");
      self.warning = Some(PersistenceWarning {
        parent_id: parent_id.to_string(),
        reason: e.to_string(),
      });
    }
  }
}

fn storage_key(parent_id: &str) -> String {
  format!("comments:{}", parent_id)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::comments::side_store::MemorySideStore;
  use color_eyre::eyre::eyre;
  use std::sync::Arc;

  #[test]
  fn reply_nests_under_its_parent_not_at_top_level() {
    let mut store = CommentStore::new(MemorySideStore::new());

    let first = store
      .add_comment("E1", "initial thoughts", "alice", None)
      .unwrap();
    let reply = store
      .add_comment("E1", "agreed", "bob", Some(&first))
      .unwrap();

    let thread = store.thread("E1");
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].id, reply);

    // find_by_id locates the nested reply
    let found = store.find_by_id("E1", &reply).unwrap();
    assert_eq!(found.author, "bob");
  }

  #[test]
  fn blank_text_is_rejected_without_touching_the_thread() {
    let mut store = CommentStore::new(MemorySideStore::new());

    let err = store.add_comment("E1", "   ", "alice", None).unwrap_err();
    assert!(matches!(err, ResourceError::Validation { .. }));
    assert!(store.thread("E1").is_empty());
  }

  #[test]
  fn reply_to_vanished_comment_is_not_found() {
    let mut store = CommentStore::new(MemorySideStore::new());
    let err = store
      .add_comment("E1", "into the void", "alice", Some("c99"))
      .unwrap_err();
    assert_eq!(err, ResourceError::not_found("c99"));
  }

  #[test]
  fn toggle_like_is_an_involution() {
    let mut store = CommentStore::new(MemorySideStore::new());
    let id = store.add_comment("E1", "nice", "alice", None).unwrap();

    assert_eq!(store.toggle_like("E1", &id, "u1"), Some(true));
    let comment = store.find_by_id("E1", &id).unwrap();
    assert_eq!(comment.likes, 1);
    assert!(comment.liked_by.contains("u1"));

    assert_eq!(store.toggle_like("E1", &id, "u1"), Some(false));
    let comment = store.find_by_id("E1", &id).unwrap();
    assert_eq!(comment.likes, 0);
    assert!(comment.liked_by.is_empty());
  }

  #[test]
  fn toggle_like_on_vanished_comment_is_a_noop() {
    let mut store = CommentStore::new(MemorySideStore::new());
    assert_eq!(store.toggle_like("E1", "c42", "u1"), None);
  }

  #[test]
  fn threads_survive_a_store_restart() {
    let side = Arc::new(MemorySideStore::new());

    let mut store = CommentStore::new(Arc::clone(&side));
    let first = store.add_comment("E1", "hello", "alice", None).unwrap();
    store.add_comment("E1", "reply", "bob", Some(&first)).unwrap();
    drop(store);

    let mut reloaded = CommentStore::new(side);
    let thread = reloaded.thread("E1");
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].replies.len(), 1);

    // New ids keep counting past the persisted ones.
    let next = reloaded.add_comment("E1", "later", "carol", None).unwrap();
    assert_eq!(next, "c3");
  }

  #[test]
  fn drifted_like_counts_are_healed_on_load() {
    let side = Arc::new(MemorySideStore::new());
    let thread = serde_json::json!([{
      "id": "c1",
      "text": "hello",
      "author": "alice",
      "timestamp": "2024-05-01T10:00:00Z",
      "likes": 7,
      "liked_by": ["u1"],
      "replies": []
    }]);
    side.write("comments:E1", &thread).unwrap();

    let mut store = CommentStore::new(side);
    let comment = store.find_by_id("E1", "c1").unwrap();
    assert_eq!(comment.likes, 1);
  }

  struct FailingStore;

  impl SideStore for FailingStore {
    fn read(&self, _key: &str) -> color_eyre::Result<Option<serde_json::Value>> {
      Ok(None)
    }

    fn write(&self, _key: &str, _value: &serde_json::Value) -> color_eyre::Result<()> {
      Err(eyre!("disk full"))
    }
  }

  #[test]
  fn persistence_failure_warns_but_keeps_memory_state() {
    let mut store = CommentStore::new(FailingStore);

    let id = store.add_comment("E1", "still here", "alice", None).unwrap();
    assert_eq!(store.thread("E1").len(), 1);

    let warning = store.take_warning().expect("warning surfaced");
    assert_eq!(warning.parent_id, "E1");
    assert!(warning.reason.contains("disk full"));

    // Warning is taken once, then cleared.
    assert!(store.take_warning().is_none());

    // The thread keeps working despite the failed write.
    assert_eq!(store.toggle_like("E1", &id, "u1"), Some(true));
  }
}
