use core::any::Any;

use crate::bind::{Bind, BindContext};
use crate::error::BindError;
use crate::link::{Link, Linker};
use crate::path::FieldPath;
use crate::tag::FieldTag;
use crate::unbind::{Unbind, UnbindContext};
use crate::value::Value;

/// Structural category of a field's type, used to drive binding dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Strings, booleans, numbers, durations and named primitives.
    Primitive,
    /// A nested record.
    Record,
    /// `Option<T>` or `Box<T>`.
    Pointer,
    /// `Vec<T>`.
    Sequence,
    /// String-keyed maps of typed values.
    Mapping,
    /// `Value` or `Map`, copied through unchanged.
    Raw,
    /// `Box<dyn Dynamic>`.
    Polymorphic,
    /// `Ref<T>`.
    Reference,
    /// A type with custom marshal/unmarshal hooks.
    Hook,
}

/// Static description of a record type, generated by `#[derive(Bindable)]`.
#[derive(Debug)]
pub struct RecordDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldInfo],
}

/// One declared field of a record.
#[derive(Debug)]
pub struct FieldInfo {
    /// Rust identifier.
    pub ident: &'static str,
    /// Raw annotation string, parsed with [`FieldTag::parse`].
    pub tag: &'static str,
    /// Descriptor of the embedded record when the field is promoted.
    pub embedded: Option<fn() -> &'static RecordDescriptor>,
}

/// A typed record whose fields can be visited by index.
///
/// Indices refer to positions in [`RecordDescriptor::fields`]. Implemented by
/// `#[derive(Bindable)]`; embedded fields are reached through
/// [`Record::embedded_mut`] rather than [`Record::field_mut`].
pub trait Record: Any {
    fn descriptor() -> &'static RecordDescriptor
    where
        Self: Sized;

    fn record_descriptor(&self) -> &'static RecordDescriptor;

    fn field_ref(&self, index: usize) -> Option<&dyn FieldSlot>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn FieldSlot>;

    fn embedded_ref(&self, _index: usize) -> Option<&dyn Record> {
        None
    }

    fn embedded_mut(&mut self, _index: usize) -> Option<&mut dyn Record> {
        None
    }

    /// Stores this record in the linker registry when it is identifiable.
    fn register_identity(&self, _linker: &mut Linker) {}
}

/// Object-safe view of a single field value.
pub trait FieldSlot {
    fn bind_slot(&mut self, value: &Value, cx: &mut BindContext<'_>) -> Result<(), BindError>;

    fn unbind_slot(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError>;

    fn kind(&self) -> FieldKind;

    /// Bound in the second pass, after every other field of the record.
    fn deferred(&self) -> bool;

    fn is_present(&self) -> bool;

    fn is_zero(&self) -> bool;

    fn register_slot(&self, linker: &mut Linker);

    fn resolve_slot(&self, linker: &mut Linker) -> Result<(), BindError>;
}

impl<T: Bind + Unbind + Link + 'static> FieldSlot for T {
    fn bind_slot(&mut self, value: &Value, cx: &mut BindContext<'_>) -> Result<(), BindError> {
        cx.bind_into(self, value)
    }

    fn unbind_slot(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        cx.unbind_value(self)
    }

    fn kind(&self) -> FieldKind {
        T::KIND
    }

    fn deferred(&self) -> bool {
        T::DEFERRED
    }

    fn is_present(&self) -> bool {
        Unbind::is_present(self)
    }

    fn is_zero(&self) -> bool {
        Unbind::is_zero(self)
    }

    fn register_slot(&self, linker: &mut Linker) {
        self.register_refs(linker);
    }

    fn resolve_slot(&self, linker: &mut Linker) -> Result<(), BindError> {
        self.resolve_refs(linker)
    }
}

/// A field after tag parsing and embedded-record promotion.
#[derive(Debug, Clone)]
pub(crate) struct PlannedField {
    /// Embedded-record indices leading to the owning record, then the field index.
    route: Vec<usize>,
    pub ident: &'static str,
    pub name: String,
    pub tag: FieldTag,
}

impl PlannedField {
    pub fn slot_ref<'r>(&self, record: &'r dyn Record) -> Option<&'r dyn FieldSlot> {
        let (last, embedded) = self.route.split_last()?;
        let mut current = record;
        for &index in embedded {
            current = current.embedded_ref(index)?;
        }
        current.field_ref(*last)
    }

    pub fn slot_mut<'r>(&self, record: &'r mut dyn Record) -> Option<&'r mut dyn FieldSlot> {
        let (last, embedded) = self.route.split_last()?;
        let mut current = record;
        for &index in embedded {
            current = current.embedded_mut(index)?;
        }
        current.field_mut(*last)
    }
}

/// Flattened field list for one record type.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordPlan {
    pub fields: Vec<PlannedField>,
    pub extra: Option<PlannedField>,
}

impl RecordPlan {
    /// Builds the plan: skipped fields are dropped, embedded fields promoted, and
    /// on a name collision the later declaration replaces the earlier one.
    pub fn build(descriptor: &'static RecordDescriptor, path: &FieldPath) -> Result<Self, BindError> {
        let mut plan = RecordPlan::default();
        let mut extras = Vec::new();
        collect(descriptor, &mut Vec::new(), &mut plan.fields, &mut extras);
        if extras.len() > 1 {
            let names: Vec<&str> = extras.iter().map(|f| f.ident).collect();
            return Err(BindError::structural(
                path,
                format!(
                    "record `{}` declares more than one extra field ({})",
                    descriptor.name,
                    names.join(", ")
                ),
            ));
        }
        plan.extra = extras.pop();
        Ok(plan)
    }

    /// Whether `key` is consumed by a named field.
    pub fn claims(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.name == key)
    }
}

fn collect(
    descriptor: &'static RecordDescriptor,
    prefix: &mut Vec<usize>,
    fields: &mut Vec<PlannedField>,
    extras: &mut Vec<PlannedField>,
) {
    for (index, info) in descriptor.fields.iter().enumerate() {
        let Some(tag) = FieldTag::parse(info.tag) else {
            continue;
        };
        prefix.push(index);
        if let Some(embedded) = info.embedded {
            collect(embedded(), prefix, fields, extras);
        } else {
            let field = PlannedField {
                route: prefix.clone(),
                ident: info.ident,
                name: tag.external_name(info.ident),
                tag,
            };
            if field.tag.extra {
                extras.push(field);
            } else if let Some(existing) = fields.iter_mut().find(|f| f.name == field.name) {
                *existing = field;
            } else {
                fields.push(field);
            }
        }
        prefix.pop();
    }
}
