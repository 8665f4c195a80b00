use darling::FromVariant;

#[derive(Debug, Default, FromVariant)]
#[darling(default, attributes(bind))]
pub struct VariantAttrs {
    /// Explicit name for this variant (overrides rename_all)
    pub rename: Option<String>,
}
