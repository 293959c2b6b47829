//! Derive macros for Custodia.
//!
//! This crate provides the `Auditable` derive, the static-dispatch
//! capability contract the audit pipeline uses to read an entity's table
//! identity and record id.

#![warn(clippy::pedantic, clippy::nursery)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, LitStr, Type};

/// Derive macro for auditable entities.
///
/// The table name comes from `#[audit(table = "...")]` on the struct
/// (defaulting to the lowercased type name), and the record id from the
/// field marked `#[audit(id)]` (defaulting to a field named `id`). The
/// id field may be `i64`, a smaller integer, or an `Option` of either.
///
/// # Example
///
/// ```rust,ignore
/// use custodia_derive::Auditable;
///
/// #[derive(Auditable)]
/// #[audit(table = "user_profiles")]
/// struct UserProfile {
///     #[audit(id)]
///     id: Option<i64>,
///     display_name: String,
/// }
/// ```
#[proc_macro_derive(Auditable, attributes(audit))]
pub fn derive_auditable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let table_name = table_name(input)?;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Auditable can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Auditable requires named fields",
        ));
    };

    let id_field = fields
        .named
        .iter()
        .find(|field| has_audit_id(field))
        .or_else(|| {
            fields.named.iter().find(|field| {
                field.ident.as_ref().is_some_and(|ident| ident == "id")
            })
        })
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "no record id field: mark one with #[audit(id)] or name it `id`",
            )
        })?;

    let id_ident = id_field.ident.as_ref().expect("named field has an ident");
    let record_id_expr = if is_option(&id_field.ty) {
        quote!(self.#id_ident.map(::core::convert::Into::into))
    } else {
        quote!(::core::option::Option::Some(::core::convert::Into::into(self.#id_ident)))
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::custodia::audit::Auditable for #name #ty_generics #where_clause {
            fn table_name(&self) -> &'static str {
                #table_name
            }

            fn record_id(&self) -> ::core::option::Option<i64> {
                #record_id_expr
            }
        }
    })
}

fn table_name(input: &DeriveInput) -> syn::Result<String> {
    let mut table: Option<LitStr> = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("audit") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                table = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported audit attribute; expected `table`"))
            }
        })?;
    }

    Ok(table.map_or_else(|| input.ident.to_string().to_lowercase(), |lit| lit.value()))
}

fn has_audit_id(field: &Field) -> bool {
    field.attrs.iter().any(|attr| {
        if !attr.path().is_ident("audit") {
            return false;
        }
        let mut found = false;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                found = true;
            }
            Ok(())
        });
        found
    })
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Option")
}
