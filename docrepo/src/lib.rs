//! # docrepo - typed repositories over a document store
//!
//! `docrepo` maps Rust record types to collections of a schemaless document
//! store and gives each type a generic CRUD repository.
//!
//! ## Key Features
//!
//! - **Convention-based naming**: `UserClaim` lives in `userclaims`, `Person` in `people`
//! - **Store-assigned identifiers**: 12-byte [ObjectId]s generated on insert
//! - **Typed and raw queries**: closures over entities, or store-side [Filter]s
//! - **Async with cancellation**: every operation has a `*_async` form taking a
//!   `CancellationToken`
//! - **Pluggable stores**: drivers are registered per connection-string scheme;
//!   `memory://` ships with the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docrepo::context::StoreContext;
//! use docrepo::repository::{Criteria, Repository};
//! use docrepo::collection::ObjectId;
//! use docrepo_derive::{Convertible, Entity};
//!
//! #[derive(Default, Clone, Convertible, Entity)]
//! struct Book {
//!     id: ObjectId,
//!     title: String,
//!     pages: i32,
//! }
//!
//! let context = StoreContext::open("memory://local/library")?;
//! let books = Repository::<Book>::new(&context)?;
//!
//! let book = books.insert(Book { title: "Dune".into(), pages: 412, ..Default::default() })?;
//! let long = books.query(Criteria::where_(|b: &Book| b.pages > 400))?.to_vec()?;
//! books.delete_by_id(&book.id.to_string())?;
//! ```
//!
//! ## Design Pattern
//!
//! Contexts, repositories and stores are handles over an `Arc`'d inner
//! value: clones are cheap, share state and can be sent across threads.
//!
//! [ObjectId]: collection::ObjectId
//! [Filter]: filter::Filter

#![allow(
    dead_code,
    clippy::new_without_default,
)]

extern crate self as docrepo;

use crate::collection::ObjectIdGenerator;
use std::sync::LazyLock;

pub mod collection;
pub mod common;
pub mod config;
pub mod context;
pub mod errors;
pub mod filter;
pub mod repository;
pub mod store;

pub use common::{atomic, Atomic, Value};

pub(crate) static ID_GENERATOR: LazyLock<ObjectIdGenerator> = LazyLock::new(ObjectIdGenerator::new);

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}
