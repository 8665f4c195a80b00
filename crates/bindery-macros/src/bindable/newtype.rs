use proc_macro2::TokenStream;
use quote::quote;
use syn::Field;

use crate::context::MacroContext;

/// A one-field tuple struct binds exactly like its inner type.
pub fn generate_newtype(context: &MacroContext, field: &Field) -> syn::Result<TokenStream> {
    if context.config.identifiable {
        return Err(syn::Error::new_spanned(
            context.ident(),
            "`identifiable` is only supported on records with named fields",
        ));
    }

    let ident = context.ident();
    let inner = &field.ty;
    let Bind = context.Bind();
    let Unbind = context.Unbind();
    let Link = context.Link();
    let Linker = context.Linker();
    let FieldKind = context.FieldKind();
    let Value = context.Value();
    let BindError = context.BindError();
    let BindContext = context.BindContext();
    let UnbindContext = context.UnbindContext();

    Ok(quote! {
        impl #Bind for #ident {
            const KIND: #FieldKind = <#inner as #Bind>::KIND;
            const DEFERRED: bool = <#inner as #Bind>::DEFERRED;

            fn bind(value: &#Value, cx: &mut #BindContext) -> ::core::result::Result<Self, #BindError> {
                ::core::result::Result::Ok(#ident(cx.bind_value::<#inner>(value)?))
            }
        }

        impl #Unbind for #ident {
            fn unbind(&self, cx: &mut #UnbindContext) -> ::core::result::Result<#Value, #BindError> {
                cx.unbind_value(&self.0)
            }

            fn is_present(&self) -> bool {
                <#inner as #Unbind>::is_present(&self.0)
            }

            fn is_zero(&self) -> bool {
                <#inner as #Unbind>::is_zero(&self.0)
            }
        }

        impl #Link for #ident {
            fn register_refs(&self, linker: &mut #Linker) {
                <#inner as #Link>::register_refs(&self.0, linker);
            }

            fn resolve_refs(&self, linker: &mut #Linker) -> ::core::result::Result<(), #BindError> {
                <#inner as #Link>::resolve_refs(&self.0, linker)
            }
        }
    })
}
