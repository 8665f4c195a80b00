
mod newtype;
mod record;
mod unit_enum;

use proc_macro2::TokenStream;
use syn::{Data, Fields};

use crate::context::MacroContext;

pub fn derive(context: MacroContext) -> TokenStream {
    derive_inner(&context).unwrap_or_else(syn::Error::into_compile_error)
}

fn derive_inner(context: &MacroContext) -> syn::Result<TokenStream> {
    context.reject_generics()?;
    match &context.input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(_) | Fields::Unit => record::generate_record(context, data),
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                newtype::generate_newtype(context, &fields.unnamed[0])
            }
            Fields::Unnamed(fields) => Err(syn::Error::new_spanned(
                fields,
                "Bindable tuple structs must have exactly one field",
            )),
        },
        Data::Enum(data) => unit_enum::generate_unit_enum(context, data),
        Data::Union(data) => Err(syn::Error::new_spanned(
            data.union_token,
            "Bindable cannot be derived for unions",
        )),
    }
}
