use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::IndexMap;

use crate::bind::{root_name, slot_ref};
use crate::coerce::MapKey;
use crate::error::BindError;
use crate::hook::Marshal;
use crate::options::Options;
use crate::path::FieldPath;
use crate::record::{Record, RecordPlan};
use crate::value::{Map, Value};

/// Replacement written for `secret` fields when redaction is enabled.
pub const REDACTED: &str = "<redacted>";

/// Types that can be turned back into a generic [`Value`].
pub trait Unbind {
    fn unbind(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError>;

    /// `false` when the field should be left out entirely (`None`).
    fn is_present(&self) -> bool {
        true
    }

    /// Zero values are left out of fields tagged `omitempty`.
    fn is_zero(&self) -> bool {
        false
    }
}

/// State threaded through one unbind call.
pub struct UnbindContext<'a> {
    options: &'a Options,
    path: FieldPath,
    depth: usize,
}

impl<'a> UnbindContext<'a> {
    pub fn new(options: &'a Options, path: FieldPath) -> Self {
        Self {
            options,
            path,
            depth: 0,
        }
    }

    pub fn options(&self) -> &'a Options {
        self.options
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Unbinds `value`, consulting registered converters first.
    pub fn unbind_value<T: Unbind + 'static>(&mut self, value: &T) -> Result<Value, BindError> {
        if let Some(result) = self.options.converters().to_value(value) {
            return result.map_err(|e| BindError::custom(&self.path, e));
        }
        if self.depth >= self.options.max_depth() {
            return Err(BindError::structural(
                &self.path,
                format!("nesting deeper than {} levels", self.options.max_depth()),
            ));
        }
        self.depth += 1;
        let result = value.unbind(self);
        self.depth -= 1;
        result
    }

    pub fn with_field<R>(&mut self, ident: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push_field(ident);
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn with_index<R>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push_index(index);
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn with_key<R>(&mut self, key: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push_key(key);
        let result = f(self);
        self.path.pop();
        result
    }

    /// Runs a [`Marshal`] hook.
    pub fn marshal<M: Marshal + ?Sized>(&mut self, value: &M) -> Result<Value, BindError> {
        value.marshal().map_err(|e| BindError::custom(&self.path, e))
    }

    /// Unbinds a record's fields into a map.
    ///
    /// Absent optionals are omitted, `omitempty` fields are omitted when zero,
    /// and the extra field's entries are merged in without overriding named fields.
    pub fn unbind_record(&mut self, record: &dyn Record) -> Result<Value, BindError> {
        let descriptor = record.record_descriptor();
        let plan = RecordPlan::build(descriptor, &self.path)?;
        tracing::trace!(record = descriptor.name, path = %self.path, "unbinding record");

        let mut out = Map::new();
        for field in &plan.fields {
            let slot = slot_ref(record, field, &self.path)?;
            if !slot.is_present() || (field.tag.omit_empty && slot.is_zero()) {
                continue;
            }
            if field.tag.secret && self.options.redact_secrets() {
                out.insert(field.name.clone(), Value::from(REDACTED));
                continue;
            }
            let value = self
                .with_field(field.ident, |cx| slot.unbind_slot(cx))
                .map_err(|e| e.at(&self.path, &field.name))?;
            out.insert(field.name.clone(), value);
        }

        if let Some(extra) = &plan.extra {
            let slot = slot_ref(record, extra, &self.path)?;
            if slot.is_present() {
                match self.with_field(extra.ident, |cx| slot.unbind_slot(cx))? {
                    Value::Map(entries) => {
                        for (key, value) in entries {
                            out.entry(key).or_insert(value);
                        }
                    }
                    Value::Null => {}
                    other => {
                        return Err(BindError::structural(
                            &self.path,
                            format!("extra field `{}` unbound to {}", extra.ident, other.kind()),
                        ));
                    }
                }
            }
        }
        Ok(Value::Map(out))
    }
}

/// Unbinds `value` into a map. Fails with a structural error for non-map results.
pub fn unbind<T: Unbind + 'static>(value: &T, options: &Options) -> Result<Map, BindError> {
    let path = FieldPath::new(root_name::<T>());
    tracing::debug!(record = path.root(), "unbinding");
    let mut cx = UnbindContext::new(options, path);
    match cx.unbind_value(value)? {
        Value::Map(map) => Ok(map),
        other => Err(BindError::structural(
            cx.path(),
            format!("expected a map, unbound to {}", other.kind()),
        )),
    }
}

/// Unbinds any value, including scalars and sequences.
pub fn unbind_value<T: Unbind + 'static>(value: &T, options: &Options) -> Result<Value, BindError> {
    UnbindContext::new(options, FieldPath::new(root_name::<T>())).unbind_value(value)
}

impl Unbind for Value {
    fn unbind(&self, _cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        Ok(self.clone())
    }

    fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.is_zero(),
            Value::String(s) => s.is_empty(),
            Value::Map(m) => m.is_empty(),
            Value::Array(a) => a.is_empty(),
        }
    }
}

impl<T: Unbind + 'static> Unbind for Option<T> {
    fn unbind(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        match self {
            Some(inner) => cx.unbind_value(inner),
            None => Ok(Value::Null),
        }
    }

    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl<T: Unbind + 'static> Unbind for Box<T> {
    fn unbind(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        cx.unbind_value(&**self)
    }

    fn is_present(&self) -> bool {
        (**self).is_present()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

impl<T: Unbind + 'static> Unbind for Vec<T> {
    fn unbind(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        let mut out = Vec::with_capacity(self.len());
        for (index, item) in self.iter().enumerate() {
            out.push(cx.with_index(index, |cx| cx.unbind_value(item))?);
        }
        Ok(Value::Array(out))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

fn unbind_entries<'v, K, V>(
    entries: impl Iterator<Item = (&'v K, &'v V)>,
    cx: &mut UnbindContext<'_>,
) -> Result<Value, BindError>
where
    K: MapKey + 'v,
    V: Unbind + 'static,
{
    let mut out = Map::new();
    for (key, item) in entries {
        let key = key.to_key();
        let value = cx.with_key(&key, |cx| cx.unbind_value(item))?;
        out.insert(key, value);
    }
    Ok(Value::Map(out))
}

impl<K, V, S> Unbind for HashMap<K, V, S>
where
    K: MapKey,
    V: Unbind + 'static,
    S: BuildHasher,
{
    /// Keys are emitted in sorted order so output is stable.
    fn unbind(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        let mut entries: Vec<(String, &V)> = self.iter().map(|(k, v)| (k.to_key(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        unbind_entries(entries.iter().map(|(k, v)| (k, *v)), cx)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Unbind for BTreeMap<K, V>
where
    K: MapKey,
    V: Unbind + 'static,
{
    fn unbind(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        unbind_entries(self.iter(), cx)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Unbind for IndexMap<K, V, S>
where
    K: MapKey,
    V: Unbind + 'static,
{
    fn unbind(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        unbind_entries(self.iter(), cx)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
