//! Translation items and their in-memory store.

mod store;
mod types;

pub use store::{ItemStore, StateCounts};
pub use types::TranslationItem;
