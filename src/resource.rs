//! Core trait for entities managed by list controllers.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for domain entities that list controllers can manage.
///
/// Implementors describe their own schema to the generic machinery: which
/// fields are searched, which field is the status, what must be non-blank
/// before a create is allowed to reach the network.
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Partial update applied to an entity. Patches are idempotent field
  /// replacements, never deltas or merges.
  type Patch: Clone + Send + Sync + Serialize + 'static;

  /// Server-assigned identifier. Drafts return `None` until creation
  /// succeeds; the id is immutable once assigned.
  fn id(&self) -> Option<&str>;

  /// Resource type name for cache namespacing and client routing
  /// (e.g., "issue", "epic").
  fn resource_type() -> &'static str;

  /// Text fields the case-insensitive substring search runs over.
  fn search_text(&self) -> Vec<&str>;

  /// Status value for exact-match filtering, if the type has one.
  fn status(&self) -> Option<&str> {
    None
  }

  /// Priority value for exact-match filtering, if the type has one.
  fn priority(&self) -> Option<&str> {
    None
  }

  /// Names of required fields that are currently empty or blank.
  /// A non-empty result blocks `create` before any network call.
  fn missing_required_fields(&self) -> Vec<&'static str> {
    Vec::new()
  }

  /// Apply a patch in place.
  fn apply_patch(&mut self, patch: &Self::Patch);
}
