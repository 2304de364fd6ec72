//! Comment tree structure and recursive lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single comment. Replies are comments themselves, recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
  pub id: String,
  pub text: String,
  pub author: String,
  pub timestamp: DateTime<Utc>,
  /// Like count. Kept equal to `liked_by.len()` by reconciliation after
  /// every mutation and on load; never trusted on its own.
  #[serde(default)]
  pub likes: u32,
  /// User ids that have liked this comment. Membership is the source of
  /// truth for the like count.
  #[serde(default)]
  pub liked_by: BTreeSet<String>,
  #[serde(default)]
  pub replies: Vec<Comment>,
}

impl Comment {
  pub(crate) fn new(id: String, text: String, author: String) -> Self {
    Self {
      id,
      text,
      author,
      timestamp: Utc::now(),
      likes: 0,
      liked_by: BTreeSet::new(),
      replies: Vec::new(),
    }
  }

  /// Reset `likes` to `|liked_by|`, recursively. Heals drifted counts in
  /// persisted data.
  pub(crate) fn reconcile_likes(&mut self) {
    self.likes = self.liked_by.len() as u32;
    for reply in &mut self.replies {
      reply.reconcile_likes();
    }
  }
}

/// Depth-first search through a thread for a comment id.
pub(crate) fn find_in<'a>(comments: &'a [Comment], id: &str) -> Option<&'a Comment> {
  for comment in comments {
    if comment.id == id {
      return Some(comment);
    }
    if let Some(found) = find_in(&comment.replies, id) {
      return Some(found);
    }
  }
  None
}

/// Mutable counterpart of [`find_in`].
pub(crate) fn find_in_mut<'a>(comments: &'a mut [Comment], id: &str) -> Option<&'a mut Comment> {
  for comment in comments.iter_mut() {
    if comment.id == id {
      return Some(comment);
    }
    if let Some(found) = find_in_mut(&mut comment.replies, id) {
      return Some(found);
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  fn comment(id: &str, replies: Vec<Comment>) -> Comment {
    Comment {
      replies,
      ..Comment::new(id.to_string(), format!("text {}", id), "alice".to_string())
    }
  }

  #[test]
  fn search_is_depth_first_through_nested_replies() {
    let thread = vec![
      comment("c1", vec![comment("c2", vec![comment("c3", vec![])])]),
      comment("c4", vec![]),
    ];

    assert_eq!(find_in(&thread, "c3").map(|c| c.id.as_str()), Some("c3"));
    assert_eq!(find_in(&thread, "c4").map(|c| c.id.as_str()), Some("c4"));
    assert!(find_in(&thread, "c9").is_none());
  }

  #[test]
  fn reconcile_fixes_drifted_counts_recursively() {
    let mut root = comment("c1", vec![comment("c2", vec![])]);
    root.liked_by.insert("u1".to_string());
    root.liked_by.insert("u2".to_string());
    root.likes = 17;
    root.replies[0].likes = 3;

    root.reconcile_likes();
    assert_eq!(root.likes, 2);
    assert_eq!(root.replies[0].likes, 0);
  }
}
