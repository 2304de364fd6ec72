//! Backend access: the resource client contract and its REST implementation.

mod api_types;
mod rest;

pub use rest::RestClient;

use crate::error::ResourceError;
use crate::resource::Resource;

/// The five operations the core requires of a backend, per resource type.
///
/// Implementations must reject with a distinguishable error: connection
/// failures and timeouts as [`ResourceError::Network`], non-success
/// responses as [`ResourceError::Server`].
#[allow(async_fn_in_trait)]
pub trait ResourceClient<T: Resource> {
  /// Fetch the full collection.
  async fn list(&self) -> Result<Vec<T>, ResourceError>;

  /// Fetch a single entity by id.
  async fn get(&self, id: &str) -> Result<T, ResourceError>;

  /// Create from a draft (no id); returns the entity with its
  /// server-assigned id.
  async fn create(&self, draft: &T) -> Result<T, ResourceError>;

  /// Apply a patch; returns the updated entity.
  async fn update(&self, id: &str, patch: &T::Patch) -> Result<T, ResourceError>;

  /// Delete by id.
  async fn delete(&self, id: &str) -> Result<(), ResourceError>;
}
