mod claim;
mod links;
mod role;
mod user;

pub use claim::*;
pub use links::*;
pub use role::*;
pub use user::*;
