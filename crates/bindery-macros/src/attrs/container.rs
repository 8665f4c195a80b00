use darling::FromDeriveInput;
use syn::Path;

use super::RenameAll;

#[derive(Debug, Default, FromDeriveInput)]
#[darling(attributes(bind), default)]
pub struct ContainerAttrs {
    #[darling(rename = "crate")]
    pub crate_path: Option<Path>,
    /// Renames fields of a record or variants of an enum.
    pub rename_all: Option<RenameAll>,
    /// The record implements `Identifiable` and can be a reference target.
    pub identifiable: bool,
}
