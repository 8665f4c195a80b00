mod container;
mod field;
mod rename_all;
mod span_extract;
mod variant;

pub use container::ContainerAttrs;
pub use field::FieldAttrs;
pub use rename_all::RenameAll;
pub use span_extract::extract_bind_attr_spans;
pub use variant::VariantAttrs;
