//! Typed repositories over store collections.
//!
//! An [Entity] maps to one collection, named by convention. A [Repository]
//! gives CRUD access to it, synchronously or as futures that honour a
//! `CancellationToken`:
//!
//! ```rust,ignore
//! use docrepo::repository::{Criteria, Repository};
//!
//! let repo = Repository::<Order>::new(&context)?;
//! let order = repo.insert(Order { total: 10, ..Default::default() })?;
//! let big = repo.query(Criteria::where_(|o: &Order| o.total > 5))?.to_vec()?;
//! let token = CancellationToken::new();
//! repo.delete_async(&order, &token).await?;
//! ```

mod async_ops;
mod criteria;
mod cursor;
mod entity;
mod factory;
#[allow(clippy::module_inception)]
mod repository;

pub use criteria::*;
pub use cursor::*;
pub use entity::*;
pub use factory::*;
pub use repository::*;
