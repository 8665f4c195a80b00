//! Derive macros for `bindery`.
//!
//! Re-exported from the `bindery` crate; depend on that instead.

use darling::FromDeriveInput;
use syn::parse_macro_input;

use crate::{attrs::ContainerAttrs, config::MacroConfig, context::MacroContext};

mod attrs;
mod bindable;
pub(crate) mod config;
pub(crate) mod context;
mod hooked;
mod util;

/// Implements `Record`, `Bind`, `Unbind` and `Link`.
///
/// Structs with named fields become records. A one-field tuple struct is a
/// transparent named primitive, and a fieldless enum binds from a string.
///
/// Field attributes: `#[bind(tag = "name,required,omitempty,secret,extra,match=\"v\"")]`,
/// `#[bind(embed)]` to promote a nested record's fields and `#[bind(skip)]`.
/// Container attributes: `#[bind(identifiable)]` registers the record with
/// the linker (requires `Clone` and `Identifiable`), `#[bind(rename_all = "...")]`
/// and `#[bind(crate = path)]`.
#[proc_macro_derive(Bindable, attributes(bind))]
pub fn bindable_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    match create_context(input) {
        Ok(context) => bindable::derive(context).into(),
        Err(err) => err.write_errors().into(),
    }
}

/// Implements `Bind`, `Unbind` and `Link` through the type's own
/// `Unmarshal` and `Marshal` impls. The type must also be `Default`.
#[proc_macro_derive(Hooked, attributes(bind))]
pub fn hooked_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    match create_context(input) {
        Ok(context) => hooked::derive(context).into(),
        Err(err) => err.write_errors().into(),
    }
}

fn create_context(input: syn::DeriveInput) -> darling::Result<MacroContext> {
    let attrs = ContainerAttrs::from_derive_input(&input)?;
    Ok(MacroContext::new(MacroConfig::from_attrs(attrs), input))
}
