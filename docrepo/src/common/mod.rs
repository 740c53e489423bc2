mod cancellation;
mod constants;
mod convertible;
pub mod naming;
mod type_utils;
mod value;

pub use cancellation::*;
pub use constants::*;
pub use convertible::*;
pub use naming::{bare_type_name, collection_name, pluralize};
pub use type_utils::*;
pub use value::*;
