//! Documents, identifiers and collection handles.

mod document;
mod handle;
pub mod id_codec;
mod object_id;

pub use document::*;
pub use handle::*;
pub use object_id::*;
