//! The resource list controller: one reusable contract behind every
//! "list X, filter X, create/edit/delete X" screen.

mod filter;
mod list;

pub use filter::{FieldFilter, FilterState, FilterUpdate};
pub use list::{ControllerOptions, ControllerState, ListController};
