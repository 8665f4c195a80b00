use darling::FromField;
use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{DataStruct, Field, Member};

use crate::attrs::{FieldAttrs, extract_bind_attr_spans};
use crate::context::MacroContext;
use crate::util::{darling_error, error, unraw};


/// Tag tokens that are flags rather than a name.
const FLAGS: &[&str] = &["required", "secret", "omitempty", "+omitempty", "extra", "+extra"];

enum Access {
    /// Skipped; no accessor is generated.
    None,
    /// `self.field`, plus the `dyn FieldSlot` type spanned at the field type.
    Slot(Member, TokenStream),
    Embedded(Member),
}

struct PlannedField {
    info: TokenStream,
    access: Access,
}

pub fn generate_record(context: &MacroContext, input: &DataStruct) -> syn::Result<TokenStream> {
    let fields = input
        .fields
        .iter()
        .map(|field| plan_field(context, field))
        .collect::<syn::Result<Vec<_>>>()?;

    let ident = context.ident();
    let name = unraw(ident);
    let Record = context.Record();
    let RecordDescriptor = context.RecordDescriptor();
    let FieldSlot = context.FieldSlot();
    let Linker = context.Linker();

    let infos = fields.iter().map(|field| &field.info);
    let slot_arms = fields.iter().enumerate().filter_map(|(index, field)| match &field.access {
        Access::Slot(member, slot) => {
            Some(quote! { #index => ::core::option::Option::Some(&self.#member as &#slot) })
        }
        _ => None,
    });
    let slot_mut_arms = fields.iter().enumerate().filter_map(|(index, field)| match &field.access {
        Access::Slot(member, slot) => {
            Some(quote! { #index => ::core::option::Option::Some(&mut self.#member as &mut #slot) })
        }
        _ => None,
    });
    let embedded_arms = fields.iter().enumerate().filter_map(|(index, field)| match &field.access {
        Access::Embedded(member) => {
            Some(quote! { #index => ::core::option::Option::Some(&self.#member as &dyn #Record) })
        }
        _ => None,
    });
    let embedded_mut_arms = fields.iter().enumerate().filter_map(|(index, field)| match &field.access {
        Access::Embedded(member) => {
            Some(quote! { #index => ::core::option::Option::Some(&mut self.#member as &mut dyn #Record) })
        }
        _ => None,
    });
    let has_embedded = fields.iter().any(|field| matches!(field.access, Access::Embedded(_)));

    let embedded_fns = has_embedded.then(|| {
        quote! {
            fn embedded_ref(&self, index: usize) -> ::core::option::Option<&dyn #Record> {
                match index {
                    #(#embedded_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn embedded_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn #Record> {
                match index {
                    #(#embedded_mut_arms,)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    });

    let identity = context.config.identifiable.then(|| {
        quote! {
            fn register_identity(&self, linker: &mut #Linker) {
                linker.insert_record(::std::sync::Arc::new(::core::clone::Clone::clone(self)));
            }
        }
    });
    let ref_target = context.config.identifiable.then(|| impl_ref_target(context));
    let record_traits = context.impl_record_traits();

    Ok(quote! {
        impl #Record for #ident {
            fn descriptor() -> &'static #RecordDescriptor {
                static DESCRIPTOR: #RecordDescriptor = #RecordDescriptor {
                    name: #name,
                    fields: &[#(#infos,)*],
                };
                &DESCRIPTOR
            }

            fn record_descriptor(&self) -> &'static #RecordDescriptor {
                <Self as #Record>::descriptor()
            }

            fn field_ref(&self, index: usize) -> ::core::option::Option<&dyn #FieldSlot> {
                match index {
                    #(#slot_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn #FieldSlot> {
                match index {
                    #(#slot_mut_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            #embedded_fns

            #identity
        }

        #record_traits

        #ref_target
    })
}

fn plan_field(context: &MacroContext, field: &Field) -> syn::Result<PlannedField> {
    let attrs = FieldAttrs::from_field(field).map_err(darling_error)?;
    let spans = extract_bind_attr_spans(&field.attrs);
    let span_of = |key: &str| spans.get(key).copied().unwrap_or_else(|| field.span());

    if attrs.skip && attrs.tag.is_some() {
        return Err(error(span_of("skip"), "`skip` cannot be combined with `tag`"));
    }
    if attrs.embed && attrs.skip {
        return Err(error(span_of("embed"), "`embed` cannot be combined with `skip`"));
    }
    if attrs.embed && attrs.tag.is_some() {
        return Err(error(
            span_of("tag"),
            "embedded records take their keys from their own fields; remove `tag`",
        ));
    }

    let Some(ident) = &field.ident else {
        return Err(syn::Error::new_spanned(field, "record fields must be named"));
    };
    let ident_name = unraw(ident);
    let member = Member::Named(ident.clone());
    let FieldInfo = context.FieldInfo();
    let Record = context.Record();
    let FieldSlot = context.FieldSlot();
    let ty = &field.ty;

    if attrs.embed {
        let info = quote! {
            #FieldInfo {
                ident: #ident_name,
                tag: "",
                embedded: ::core::option::Option::Some(<#ty as #Record>::descriptor),
            }
        };
        return Ok(PlannedField {
            info,
            access: Access::Embedded(member),
        });
    }

    let tag = match context.apply_rename(&ident_name) {
        Some(renamed) if !attrs.is_skipped() => with_name(attrs.raw_tag(), &renamed),
        _ => attrs.raw_tag().to_string(),
    };
    let info = quote! {
        #FieldInfo {
            ident: #ident_name,
            tag: #tag,
            embedded: ::core::option::Option::None,
        }
    };
    let access = if attrs.is_skipped() {
        Access::None
    } else {
        Access::Slot(member, quote_spanned! {ty.span()=> dyn #FieldSlot })
    };
    Ok(PlannedField { info, access })
}

/// Puts `name` in the name position of `tag` unless the tag already names the field.
fn with_name(tag: &str, name: &str) -> String {
    let first = tag.split(',').next().unwrap_or("").trim();
    if first.is_empty() {
        let rest = tag.find(',').map(|at| &tag[at..]).unwrap_or("");
        format!("{name}{rest}")
    } else if FLAGS.contains(&first) || first.starts_with("match") {
        format!("{name},{tag}")
    } else {
        tag.to_string()
    }
}

fn impl_ref_target(context: &MacroContext) -> TokenStream {
    let ident = context.ident();
    let krate = &context.config.bindery_crate;
    let Record = context.Record();
    quote! {
        impl #krate::__private::RefTarget for #ident {
            fn target_name() -> &'static str {
                <Self as #Record>::descriptor().name
            }

            fn from_entry(entry: &#krate::__private::LinkEntry) -> ::core::option::Option<Self> {
                #krate::__private::downcast_entry::<Self>(entry).map(|shared| ::core::clone::Clone::clone(&*shared))
            }

            fn target_identity(&self) -> &str {
                <Self as #krate::Identifiable>::identity(self)
            }
        }
    }
}
