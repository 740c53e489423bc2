//! Derive macros for `docrepo`.
//!
//! - `#[derive(Convertible)]` maps a struct with named fields to and from a
//!   document. `#[converter(ignored = "a, b")]` skips fields; skipped fields
//!   read back as `Default::default()`, and so do fields missing from the
//!   stored document.
//! - `#[derive(Entity)]` implements `docrepo::repository::Entity`.
//!   `#[entity(collection = "name")]` overrides the collection name and
//!   `#[entity(id(field = "key"))]` picks the identifier field (default `id`),
//!   which must be an `ObjectId`.
//!
//! ```rust,ignore
//! #[derive(Default, Clone, Convertible, Entity)]
//! #[converter(ignored = "cached_total")]
//! #[entity(collection = "orders")]
//! struct Order {
//!     id: ObjectId,
//!     customer: String,
//!     cached_total: i64,
//! }
//! ```

#![recursion_limit = "128"]

extern crate proc_macro;
mod convertible;
mod entity;

use crate::convertible::generate_convertible_for_struct;
use crate::entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convert(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_convertible_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => {
                let error = syn::Error::new_spanned(
                    &ast,
                    format!(
                        "Failed to derive Convertible for struct '{}': {}.\n\
                         Make sure all fields implement Convertible.",
                        ast.ident, e
                    ),
                );
                error.to_compile_error().into()
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Convertible can only be derived for structs with named fields.",
            );
            error.to_compile_error().into()
        }
    }
}

#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_entity_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => {
                let error = syn::Error::new_spanned(
                    &ast,
                    format!(
                        "Failed to derive Entity for struct '{}': {}.\n\
                         Example: #[derive(Entity)] pub struct MyEntity {{ id: ObjectId }}",
                        ast.ident, e
                    ),
                );
                error.to_compile_error().into()
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Entity for enums or unions. Only structs are supported.",
            );
            error.to_compile_error().into()
        }
    }
}
