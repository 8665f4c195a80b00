use convert_case::{Case, Casing as _};
use darling::FromVariant;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, Fields};

use crate::attrs::VariantAttrs;
use crate::context::MacroContext;
use crate::util::{darling_error, unraw};

/// A fieldless enum binds from one of its variant names.
pub fn generate_unit_enum(context: &MacroContext, input: &DataEnum) -> syn::Result<TokenStream> {
    if context.config.identifiable {
        return Err(syn::Error::new_spanned(
            context.ident(),
            "`identifiable` is only supported on records with named fields",
        ));
    }
    if input.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            context.ident(),
            "Bindable enums need at least one variant",
        ));
    }

    let mut variants = Vec::with_capacity(input.variants.len());
    for variant in &input.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Bindable enums must be fieldless; use `Box<dyn Dynamic>` for data-carrying alternatives",
            ));
        }
        let attrs = VariantAttrs::from_variant(variant).map_err(darling_error)?;
        let ident = &variant.ident;
        let name = attrs.rename.unwrap_or_else(|| {
            let raw = unraw(ident);
            context
                .apply_rename(&raw)
                .unwrap_or_else(|| raw.to_case(Case::Snake))
        });
        variants.push((ident, name));
    }

    let ident = context.ident();
    let Bind = context.Bind();
    let Unbind = context.Unbind();
    let Link = context.Link();
    let MapKey = context.MapKey();
    let FieldKind = context.FieldKind();
    let FieldPath = context.FieldPath();
    let Value = context.Value();
    let BindError = context.BindError();
    let BindContext = context.BindContext();
    let UnbindContext = context.UnbindContext();
    let krate = &context.config.bindery_crate;

    let expected = format!(
        "one of {}",
        variants
            .iter()
            .map(|(_, name)| format!("`{name}`"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let from_arms = variants.iter().map(|(variant, name)| {
        quote! { #name => ::core::result::Result::Ok(#ident::#variant) }
    });
    let to_arms = variants.iter().map(|(variant, name)| {
        quote! { #ident::#variant => #name }
    });

    Ok(quote! {
        impl #MapKey for #ident {
            fn from_key(key: &str, path: &#FieldPath) -> ::core::result::Result<Self, #BindError> {
                match key {
                    #(#from_arms,)*
                    other => ::core::result::Result::Err(#BindError::type_mismatch(
                        path,
                        #expected,
                        #Value::from(other).describe(),
                    )),
                }
            }

            fn to_key(&self) -> ::std::string::String {
                let name = match self {
                    #(#to_arms,)*
                };
                ::std::string::ToString::to_string(name)
            }
        }

        impl #Bind for #ident {
            const KIND: #FieldKind = #FieldKind::Primitive;

            fn bind(value: &#Value, cx: &mut #BindContext) -> ::core::result::Result<Self, #BindError> {
                let name = #krate::coerce::to_string(value, cx.path())?;
                <Self as #MapKey>::from_key(&name, cx.path())
            }
        }

        impl #Unbind for #ident {
            fn unbind(&self, _cx: &mut #UnbindContext) -> ::core::result::Result<#Value, #BindError> {
                ::core::result::Result::Ok(#Value::from(<Self as #MapKey>::to_key(self)))
            }
        }

        impl #Link for #ident {}
    })
}
