//! Locally persisted comment threads attached to entities.
//!
//! Threads are nested (replies hold replies), keyed by the id of the owning
//! entity, and written through to a durable local side-store on every
//! mutation. No backend endpoint is involved; durability failures degrade to
//! a non-fatal warning while the in-memory thread stays correct.

mod side_store;
mod store;
mod thread;

pub use side_store::{MemorySideStore, SideStore, SqliteSideStore};
pub use store::CommentStore;
pub use thread::Comment;
