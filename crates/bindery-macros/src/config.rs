use proc_macro2::TokenStream;
use quote::quote;

use crate::attrs::{ContainerAttrs, RenameAll};

pub struct MacroConfig {
    pub bindery_crate: TokenStream,
    pub rename_all: Option<RenameAll>,
    /// Register the record with the linker and make it a `Ref` target.
    pub identifiable: bool,
}

impl MacroConfig {
    pub fn from_attrs(attrs: ContainerAttrs) -> Self {
        use quote::ToTokens;
        let bindery_crate = attrs
            .crate_path
            .map(|path| path.into_token_stream())
            .unwrap_or_else(|| quote! { ::bindery });
        Self {
            bindery_crate,
            rename_all: attrs.rename_all,
            identifiable: attrs.identifiable,
        }
    }
}
