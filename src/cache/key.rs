//! Cache key namespacing.
//!
//! Keys follow the `resourceType:operation:params` convention. The stored
//! key is a SHA-256 hash of the normalized description, which keeps keys
//! stable and fixed-length regardless of what ends up in the params.

use sha2::{Digest, Sha256};

/// Trait for values that identify a cached query.
pub trait QueryKey {
  /// Stable, fixed-length storage key.
  fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.description().as_bytes());
    hex::encode(hasher.finalize())
  }

  /// Human-readable `resourceType:operation:params` form, used as the hash
  /// preimage and in log lines.
  fn description(&self) -> String;
}

/// Query keys for the operations list controllers cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceKey {
  /// Full collection for one resource type.
  List { resource: &'static str },
  /// A single entity by id.
  Detail { resource: &'static str, id: String },
}

impl QueryKey for ResourceKey {
  fn description(&self) -> String {
    match self {
      Self::List { resource } => format!("{}:list", resource),
      Self::Detail { resource, id } => format!("{}:detail:{}", resource, id.trim()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn list_and_detail_keys_do_not_collide() {
    let list = ResourceKey::List { resource: "issue" };
    let detail = ResourceKey::Detail {
      resource: "issue",
      id: "list".to_string(),
    };
    assert_ne!(list.cache_hash(), detail.cache_hash());
  }

  #[test]
  fn resource_types_namespace_the_key() {
    let issues = ResourceKey::List { resource: "issue" };
    let epics = ResourceKey::List { resource: "epic" };
    assert_ne!(issues.cache_hash(), epics.cache_hash());
    assert_eq!(issues.description(), "issue:list");
  }
}
