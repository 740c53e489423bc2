//! Document filters.
//!
//! Filters are built with the fluent API and combined with logical operators:
//!
//! ```rust,ignore
//! use docrepo::filter::{field, all};
//!
//! let adults = field("age").gte(18);
//! let active_admins = field("role").eq("admin").and(field("active").eq(true));
//! let either = field("email").regex("@example\\.com$")?.or(field("name").eq("root"));
//! let everything = all();
//! ```
//!
//! [FilterComposer] assembles a compound filter from an ordered list of
//! predicate-producing members over a source object.

mod basic_filters;
mod composer;
#[allow(clippy::module_inception)]
mod filter;
mod fluent;
mod logical_filters;

pub(crate) use basic_filters::*;
pub use composer::*;
pub use filter::*;
pub use fluent::*;
pub(crate) use logical_filters::*;
