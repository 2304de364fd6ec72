//! The list controller state machine.

use tracing::{debug, warn};

use crate::cache::{EntityCache, QueryKey, ResourceKey};
use crate::client::ResourceClient;
use crate::config::Config;
use crate::error::ResourceError;
use crate::resource::Resource;

use super::filter::{FilterState, FilterUpdate};

/// The controller's lifecycle state.
///
/// `Idle` until the first `load()`. Mutations move through `Mutating` and
/// land back in `Loaded` on success or in `Error` on failure (with the
/// collection already reverted). `Error` leaves on the next `load()` retry
/// or successful operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
  #[default]
  Idle,
  Loading,
  Loaded,
  Mutating,
  Error,
}

/// Tuning for a list controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
  pub page_size: usize,
  /// How long a cached collection stays fresh.
  pub cache_ttl: chrono::Duration,
}

impl Default for ControllerOptions {
  fn default() -> Self {
    Self {
      page_size: 25,
      cache_ttl: chrono::Duration::minutes(5),
    }
  }
}

impl From<&Config> for ControllerOptions {
  fn from(config: &Config) -> Self {
    Self {
      page_size: config.lists.page_size,
      cache_ttl: config.cache_ttl(),
    }
  }
}

/// Owns the collection of one resource type for one mounted screen.
///
/// Orchestrates fetch, optimistic mutation, filter/search/pagination and
/// error surfacing. The collection is replaced wholesale by `load()`
/// (last-writer-wins: an incoming full snapshot is authoritative over any
/// optimistic patch), individual entries are patched or removed by
/// mutations, and everything is discarded on `teardown()`.
///
/// Local state transitions are synchronous; the controller suspends only at
/// the network call inside `load`/`create`/`update`/`remove`. While a call
/// is in flight the presentation layer keeps rendering the last known-good
/// collection.
pub struct ListController<T: Resource, C: ResourceClient<T>> {
  client: C,
  cache: Option<EntityCache>,
  items: Vec<T>,
  filter: FilterState,
  state: ControllerState,
  error: Option<ResourceError>,
  cache_ttl: chrono::Duration,
  /// Cleared by `teardown()`; async results arriving afterwards are
  /// discarded instead of resurrecting a dismounted screen.
  alive: bool,
}

impl<T: Resource, C: ResourceClient<T>> ListController<T, C> {
  pub fn new(client: C, options: ControllerOptions) -> Self {
    Self {
      client,
      cache: None,
      items: Vec::new(),
      filter: FilterState::new(options.page_size),
      state: ControllerState::Idle,
      error: None,
      cache_ttl: options.cache_ttl,
      alive: true,
    }
  }

  /// Attach the shared entity cache. `load()` consults it before the
  /// network and mutations write the collection back through it.
  pub fn with_cache(mut self, cache: EntityCache) -> Self {
    self.cache = Some(cache);
    self
  }

  fn list_key() -> String {
    ResourceKey::List {
      resource: T::resource_type(),
    }
    .cache_hash()
  }

  /// Fetch the full collection, cache-first.
  ///
  /// On success the collection is replaced wholesale and the page re-clamped.
  /// On failure the collection keeps its last known-good value so the screen
  /// never flashes empty.
  pub async fn load(&mut self) {
    if !self.alive {
      return;
    }
    self.state = ControllerState::Loading;

    if let Some(cached) = self.cache_lookup() {
      debug!(resource = T::resource_type(), count = cached.len(), "collection served from cache");
      self.replace_collection(cached);
      return;
    }

    match self.client.list().await {
      Ok(items) => {
        if !self.alive {
          return;
        }
        self.write_cache(&items);
        self.replace_collection(items);
      }
      Err(e) => {
        if !self.alive {
          return;
        }
        warn!(resource = T::resource_type(), error = %e, "load failed");
        self.error = Some(e);
        self.state = ControllerState::Error;
      }
    }
  }

  /// Create an entity from a draft.
  ///
  /// Required-field validation runs before any network call. On success the
  /// server-returned entity is appended to the collection, never a full
  /// reload, so in-flight filter and pagination state survives. Callers that
  /// depend on server-computed ordering should follow up with `load()`.
  pub async fn create(&mut self, draft: T) -> Result<(), ResourceError> {
    if !self.alive {
      return Ok(());
    }

    let missing = draft.missing_required_fields();
    if !missing.is_empty() {
      let err = ResourceError::validation(missing);
      self.error = Some(err.clone());
      return Err(err);
    }

    self.state = ControllerState::Mutating;
    match self.client.create(&draft).await {
      Ok(created) => {
        if !self.alive {
          return Ok(());
        }
        self.items.push(created);
        self.settle_ok();
        Ok(())
      }
      Err(e) => {
        if !self.alive {
          return Ok(());
        }
        self.settle_err(e)
      }
    }
  }

  /// Patch an entity in the current collection, optimistically.
  ///
  /// The patch is applied locally before the backend confirms; on failure
  /// the entity reverts to its pre-patch snapshot. Ids are
  /// collection-relative: patching an id that is not currently listed is
  /// `NotFound`, not a network call.
  pub async fn update(&mut self, id: &str, patch: T::Patch) -> Result<(), ResourceError> {
    if !self.alive {
      return Ok(());
    }

    let Some(index) = self.position(id) else {
      let err = ResourceError::not_found(id);
      self.error = Some(err.clone());
      return Err(err);
    };

    let snapshot = self.items[index].clone();
    self.items[index].apply_patch(&patch);
    self.state = ControllerState::Mutating;

    match self.client.update(id, &patch).await {
      Ok(confirmed) => {
        if !self.alive {
          return Ok(());
        }
        // The server copy is authoritative over the optimistic patch.
        if let Some(i) = self.position(id) {
          self.items[i] = confirmed;
        }
        self.settle_ok();
        Ok(())
      }
      Err(e) => {
        if !self.alive {
          return Ok(());
        }
        if let Some(i) = self.position(id) {
          self.items[i] = snapshot;
        }
        self.settle_err(e)
      }
    }
  }

  /// Remove an entity, optimistically.
  ///
  /// The entity disappears locally before the backend confirms; on failure
  /// it reappears at its original index. Confirmation UX is the caller's
  /// concern; this method assumes the user already agreed.
  pub async fn remove(&mut self, id: &str) -> Result<(), ResourceError> {
    if !self.alive {
      return Ok(());
    }

    let Some(index) = self.position(id) else {
      let err = ResourceError::not_found(id);
      self.error = Some(err.clone());
      return Err(err);
    };

    let removed = self.items.remove(index);
    self.state = ControllerState::Mutating;

    match self.client.delete(id).await {
      Ok(()) => {
        if !self.alive {
          return Ok(());
        }
        self.settle_ok();
        Ok(())
      }
      Err(e) => {
        if !self.alive {
          return Ok(());
        }
        let at = index.min(self.items.len());
        self.items.insert(at, removed);
        self.settle_err(e)
      }
    }
  }

  /// Update filter state. Pure and synchronous; never touches the network.
  pub fn set_filter(&mut self, update: FilterUpdate) {
    self.filter.merge(update);
    let count = self.filter.matching_count(&self.items);
    self.filter.clamp_page(count);
  }

  /// Jump to a 1-based page.
  pub fn set_page(&mut self, page: usize) {
    self.filter.set_page(page);
  }

  pub fn set_page_size(&mut self, page_size: usize) {
    self.filter.set_page_size(page_size);
    let count = self.filter.matching_count(&self.items);
    self.filter.clamp_page(count);
  }

  /// The current page of the filtered collection. Fully recomputed on each
  /// call; two consecutive calls over unchanged state yield identical
  /// output.
  pub fn filtered_view(&self) -> Vec<&T> {
    self.filter.apply(&self.items)
  }

  /// The whole collection, unfiltered.
  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn state(&self) -> ControllerState {
    self.state
  }

  pub fn filter(&self) -> &FilterState {
    &self.filter
  }

  /// The current error, if any. Cleared by the next successful operation or
  /// by `dismiss_error`.
  pub fn error(&self) -> Option<&ResourceError> {
    self.error.as_ref()
  }

  pub fn dismiss_error(&mut self) {
    self.error = None;
  }

  /// Discard all state. Late async results are dropped, subsequent calls
  /// are no-ops, and the controller's own cache key is removed.
  pub fn teardown(&mut self) {
    self.alive = false;
    self.items.clear();
    self.error = None;
    self.state = ControllerState::Idle;
    if let Some(cache) = &self.cache {
      cache.remove(&Self::list_key());
    }
  }

  fn position(&self, id: &str) -> Option<usize> {
    self.items.iter().position(|item| item.id() == Some(id))
  }

  fn replace_collection(&mut self, items: Vec<T>) {
    self.items = items;
    let count = self.filter.matching_count(&self.items);
    self.filter.clamp_page(count);
    self.error = None;
    self.state = ControllerState::Loaded;
  }

  fn settle_ok(&mut self) {
    let count = self.filter.matching_count(&self.items);
    self.filter.clamp_page(count);
    self.error = None;
    self.state = ControllerState::Loaded;
    self.write_cache(&self.items);
  }

  fn settle_err(&mut self, e: ResourceError) -> Result<(), ResourceError> {
    warn!(resource = T::resource_type(), error = %e, "mutation failed, collection reverted");
    self.error = Some(e.clone());
    self.state = ControllerState::Error;
    Err(e)
  }

  fn cache_lookup(&self) -> Option<Vec<T>> {
    self.cache.as_ref()?.get(&Self::list_key())
  }

  fn write_cache(&self, items: &[T]) {
    if let Some(cache) = &self.cache {
      cache.set(&Self::list_key(), &items, self.cache_ttl);
    }
  }
}
