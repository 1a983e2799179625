//! Document persistence
//!
//! - `store`: the persistence collaborator trait and its backends
//! - `autosave`: debounced background saving

mod autosave;
mod store;

pub use autosave::{AutosaveScheduler, AutosaveState};
pub use store::{FileStore, MemoryStore, Persistence};
