//! Process-local store backing the `memory://` scheme.

mod collection;
mod config;
mod store;

pub(crate) use collection::*;
pub use config::*;
pub use store::*;
