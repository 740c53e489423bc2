//! Document store abstraction.
//!
//! Backends implement [DocumentStoreProvider] and are reached through the
//! cloneable [DocumentStore] handle. A [StoreDriver] turns a parsed
//! connection string into a store; drivers are looked up by URI scheme, and
//! the `memory` scheme is always available:
//!
//! ```rust,ignore
//! use docrepo::config::ConnectionConfig;
//! use docrepo::store::driver_for;
//!
//! let config = ConnectionConfig::parse("memory://local/app")?;
//! let store = driver_for(config.scheme())?.connect(&config)?;
//! ```

mod document_store;
mod driver;
pub mod memory;

pub use document_store::*;
pub use driver::*;
