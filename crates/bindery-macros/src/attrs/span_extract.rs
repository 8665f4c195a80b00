use proc_macro2::Span;
use std::collections::HashMap;
use syn::Attribute;
use syn::spanned::Spanned;

/// Spans of the individual keys inside `#[bind(...)]` attributes, so errors
/// can point at `embed` or `tag` rather than the whole derive.
pub fn extract_bind_attr_spans(attrs: &[Attribute]) -> HashMap<String, Span> {
    let mut spans = HashMap::new();

    for attr in attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }

        let _ = attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.get_ident() {
                spans.insert(ident.to_string(), meta.path.span());
            }
            if meta.input.peek(syn::Token![=]) {
                let _: syn::Token![=] = meta.input.parse()?;
                let _: syn::Expr = meta.input.parse()?;
            }
            Ok(())
        });
    }

    spans
}
