use proc_macro::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, LitStr, Result};

pub(crate) fn generate_entity_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut collection: Option<String> = None;
    let mut id_field = "id".to_string();
    let mut id_found = false;

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    if s.value().trim().is_empty() {
                        return Err(meta.error("collection name cannot be empty"));
                    }
                    collection = Some(s.value());
                    Ok(())
                } else if meta.path.is_ident("id") {
                    if id_found {
                        return Err(meta.error("Multiple id attributes are not allowed"));
                    }
                    id_found = true;

                    meta.parse_nested_meta(|meta| {
                        if meta.path.is_ident("field") {
                            let value = meta.value()?;
                            let s: LitStr = value.parse()?;
                            id_field = s.value();
                            Ok(())
                        } else {
                            Err(meta.error("Unknown id attribute"))
                        }
                    })
                } else {
                    Err(meta.error("Unknown entity attribute"))
                }
            })?;
        }
    }

    let id_ident = data
        .fields
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .find(|ident| *ident == id_field.as_str())
        .ok_or_else(|| {
            syn::Error::new_spanned(ast, format!("Field {} not found in struct", id_field))
        })?;

    let collection_override = match &collection {
        Some(collection) => quote! { Some(#collection) },
        None => quote! { None },
    };
    let type_name = name.to_string();

    let gen = quote! {
        impl #impl_generics docrepo::repository::Entity for #name #ty_generics #where_clause {
            fn type_name() -> String {
                #type_name.to_string()
            }

            fn collection_override() -> Option<&'static str> {
                #collection_override
            }

            fn id_field() -> &'static str {
                #id_field
            }

            fn id(&self) -> docrepo::collection::ObjectId {
                self.#id_ident
            }

            fn set_id(&mut self, id: docrepo::collection::ObjectId) {
                self.#id_ident = id;
            }
        }
    };

    Ok(TokenStream::from(gen))
}
