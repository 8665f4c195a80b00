use proc_macro2::Span;

pub fn darling_error(err: darling::Error) -> syn::Error {
    syn::Error::new(err.span(), err.to_string())
}

/// Rust identifier without the raw prefix.
pub fn unraw(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

pub fn error(span: Span, message: &str) -> syn::Error {
    syn::Error::new(span, message)
}
