use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::{DataStruct, DeriveInput, Field, LitStr, Result, Type};

pub(crate) fn generate_convertible_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let mut ignored_fields: Vec<String> = vec![];

    for attr in &ast.attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    ignored_fields.extend(
                        s.value()
                            .split(',')
                            .map(|field| field.trim().to_string())
                            .filter(|field| !field.is_empty()),
                    );
                    Ok(())
                } else {
                    Err(meta.error("Unknown converter attribute"))
                }
            })?
        }
    }

    let fields: Vec<&Field> = match &data.fields {
        syn::Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only structs with named fields are supported",
            ))
        }
    };

    for ignored in &ignored_fields {
        if !fields.iter().any(|f| f.ident.as_ref().is_some_and(|i| i == ignored)) {
            return Err(syn::Error::new_spanned(
                ast,
                format!("ignored field {} not found in struct", ignored),
            ));
        }
    }

    let stored_idents: Vec<&Ident> = fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .filter(|ident| !ignored_fields.contains(&ident.to_string()))
        .collect();

    let stored_names: Vec<String> = stored_idents.iter().map(|i| i.to_string()).collect();

    let initializers: Vec<proc_macro2::TokenStream> = fields
        .iter()
        .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
        .map(|(ident, ty): (&Ident, &Type)| {
            let name = ident.to_string();
            if ignored_fields.contains(&name) {
                quote! { #ident: ::core::default::Default::default() }
            } else {
                quote! {
                    #ident: match doc.get(#name) {
                        docrepo::common::Value::Null => ::core::default::Default::default(),
                        value => docrepo::common::from_value::<#ty>(&value)?,
                    }
                }
            }
        })
        .collect();

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics docrepo::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> docrepo::errors::RepoResult<docrepo::common::Value> {
                let mut doc = docrepo::collection::Document::new();
                #(doc.put(#stored_names, docrepo::common::Convertible::to_value(&self.#stored_idents)?)?;)*
                Ok(docrepo::common::Value::Document(doc))
            }

            fn from_value(value: &docrepo::common::Value) -> docrepo::errors::RepoResult<Self::Output> {
                match value {
                    docrepo::common::Value::Document(doc) => {
                        Ok(#name {
                            #(#initializers,)*
                        })
                    },
                    _ => {
                        Err(docrepo::errors::RepoError::new(
                            &format!("Value is not a document for {}", stringify!(#name)),
                            docrepo::errors::ErrorKind::ObjectMappingError,
                        ))
                    },
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
