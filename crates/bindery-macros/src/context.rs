use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Ident};

use crate::config::MacroConfig;

pub struct MacroContext {
    pub config: MacroConfig,
    pub input: DeriveInput,
}

impl MacroContext {
    pub fn new(config: MacroConfig, input: DeriveInput) -> Self {
        Self { config, input }
    }

    pub fn ident(&self) -> &Ident {
        &self.input.ident
    }

    /// Generic parameters are not supported; descriptors are `static`.
    pub fn reject_generics(&self) -> syn::Result<()> {
        let generics = &self.input.generics;
        if generics.params.is_empty() && generics.where_clause.is_none() {
            Ok(())
        } else {
            Err(syn::Error::new_spanned(
                generics,
                "bindery derives do not support generic types",
            ))
        }
    }

    /// Applies container-level `rename_all` to a field or variant name.
    pub fn apply_rename(&self, name: &str) -> Option<String> {
        self.config.rename_all.map(|rule| rule.apply(name))
    }

    #[allow(non_snake_case)]
    pub fn Record(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::Record)
    }

    #[allow(non_snake_case)]
    pub fn Bind(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::Bind)
    }

    #[allow(non_snake_case)]
    pub fn Unbind(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::Unbind)
    }

    #[allow(non_snake_case)]
    pub fn Link(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::Link)
    }

    #[allow(non_snake_case)]
    pub fn Linker(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::Linker)
    }

    #[allow(non_snake_case)]
    pub fn MapKey(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::coerce::MapKey)
    }

    #[allow(non_snake_case)]
    pub fn FieldKind(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::FieldKind)
    }

    #[allow(non_snake_case)]
    pub fn FieldSlot(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::__private::FieldSlot)
    }

    #[allow(non_snake_case)]
    pub fn FieldInfo(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::__private::FieldInfo)
    }

    #[allow(non_snake_case)]
    pub fn RecordDescriptor(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::__private::RecordDescriptor)
    }

    #[allow(non_snake_case)]
    pub fn Value(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::Value)
    }

    #[allow(non_snake_case)]
    pub fn BindError(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::BindError)
    }

    #[allow(non_snake_case)]
    pub fn BindContext(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::BindContext<'_>)
    }

    #[allow(non_snake_case)]
    pub fn UnbindContext(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::UnbindContext<'_>)
    }

    #[allow(non_snake_case)]
    pub fn FieldPath(&self) -> TokenStream {
        let krate = &self.config.bindery_crate;
        quote!(#krate::FieldPath)
    }

    /// `Bind`, `Unbind` and `Link` impls shared by every record-shaped type.
    pub fn impl_record_traits(&self) -> TokenStream {
        let ident = self.ident();
        let Bind = self.Bind();
        let Unbind = self.Unbind();
        let Link = self.Link();
        let Linker = self.Linker();
        let FieldKind = self.FieldKind();
        let Value = self.Value();
        let BindError = self.BindError();
        let BindContext = self.BindContext();
        let UnbindContext = self.UnbindContext();
        let shared = self.config.identifiable.then(|| {
            quote! {
                fn register_shared(this: &::std::sync::Arc<Self>, linker: &mut #Linker) {
                    linker.register_shared_record(this);
                }
            }
        });
        quote! {
            impl #Bind for #ident {
                const KIND: #FieldKind = #FieldKind::Record;

                fn bind(value: &#Value, cx: &mut #BindContext) -> ::core::result::Result<Self, #BindError> {
                    let mut out = <Self as ::core::default::Default>::default();
                    cx.bind_record(&mut out, value)?;
                    ::core::result::Result::Ok(out)
                }

                fn bind_into(&mut self, value: &#Value, cx: &mut #BindContext) -> ::core::result::Result<(), #BindError> {
                    cx.bind_record(self, value)
                }
            }

            impl #Unbind for #ident {
                fn unbind(&self, cx: &mut #UnbindContext) -> ::core::result::Result<#Value, #BindError> {
                    cx.unbind_record(self)
                }
            }

            impl #Link for #ident {
                fn register_refs(&self, linker: &mut #Linker) {
                    linker.register_record(self);
                }

                fn resolve_refs(&self, linker: &mut #Linker) -> ::core::result::Result<(), #BindError> {
                    linker.resolve_record(self)
                }

                #shared
            }
        }
    }
}
