use proc_macro2::TokenStream;
use quote::quote;

use crate::context::MacroContext;


pub fn derive(context: MacroContext) -> TokenStream {
    derive_inner(&context).unwrap_or_else(syn::Error::into_compile_error)
}

fn derive_inner(context: &MacroContext) -> syn::Result<TokenStream> {
    context.reject_generics()?;
    if context.config.identifiable || context.config.rename_all.is_some() {
        return Err(syn::Error::new_spanned(
            context.ident(),
            "Hooked only accepts `#[bind(crate = ...)]`",
        ));
    }

    let ident = context.ident();
    let Bind = context.Bind();
    let Unbind = context.Unbind();
    let Link = context.Link();
    let FieldKind = context.FieldKind();
    let Value = context.Value();
    let BindError = context.BindError();
    let BindContext = context.BindContext();
    let UnbindContext = context.UnbindContext();

    Ok(quote! {
        impl #Bind for #ident {
            const KIND: #FieldKind = #FieldKind::Hook;
            const DEFERRED: bool = true;

            fn bind(value: &#Value, cx: &mut #BindContext) -> ::core::result::Result<Self, #BindError> {
                let mut out = <Self as ::core::default::Default>::default();
                cx.unmarshal::<Self>(&mut out, value)?;
                ::core::result::Result::Ok(out)
            }
        }

        impl #Unbind for #ident {
            fn unbind(&self, cx: &mut #UnbindContext) -> ::core::result::Result<#Value, #BindError> {
                cx.marshal::<Self>(self)
            }
        }

        impl #Link for #ident {}
    })
}
