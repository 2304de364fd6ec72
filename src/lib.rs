//! Client-side core for project-management dashboards.
//!
//! Every dashboard screen follows the same shape: fetch a list of entities,
//! filter and paginate it locally, mutate through dialogs, keep the view
//! responsive while the backend confirms. This crate packages that shape
//! once instead of once per screen:
//!
//! - [`controller::ListController`]: the list/filter/mutate state machine,
//!   generic over the entity type and the backend client
//! - [`cache::EntityCache`]: a process-wide, time-expiring read cache
//! - [`comments::CommentStore`]: locally persisted discussion threads
//! - [`client::RestClient`]: a reqwest-backed implementation of the backend
//!   contract
//!
//! The presentation layer consumes controller state and is not part of this
//! crate.

pub mod cache;
pub mod client;
pub mod comments;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod resource;
pub mod session;

pub use cache::EntityCache;
pub use client::{ResourceClient, RestClient};
pub use comments::CommentStore;
pub use config::Config;
pub use controller::ListController;
pub use error::{PersistenceWarning, ResourceError};
pub use resource::Resource;
pub use session::{SessionContext, SessionHandle};
