use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use indexmap::IndexMap;

use crate::coerce::{MapKey, literal_matches};
use crate::error::BindError;
use crate::hook::{HookContext, Unmarshal};
use crate::options::Options;
use crate::path::FieldPath;
use crate::record::{FieldKind, FieldSlot, PlannedField, Record, RecordPlan};
use crate::unbind::UnbindContext;
use crate::value::{Map, Value};

/// Types that can be populated from a generic [`Value`].
///
/// Implemented for primitives, durations, `Option`, `Box`, `Vec`, maps,
/// [`Value`] itself, and by `#[derive(Bindable)]` / `#[derive(Hooked)]`.
pub trait Bind: Sized {
    /// Structural category used for dispatch decisions.
    const KIND: FieldKind;

    /// Bound after all non-deferred siblings (hook types and containers of them).
    const DEFERRED: bool = false;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError>;

    /// Binds into an existing value. Records keep fields whose keys are absent.
    fn bind_into(&mut self, value: &Value, cx: &mut BindContext<'_>) -> Result<(), BindError> {
        *self = Self::bind(value, cx)?;
        Ok(())
    }
}

/// Whether existing nested values are reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BindMode {
    /// The target starts from its default value.
    #[default]
    Fresh,
    /// Existing values are kept for absent keys and existing `Some`/`Box` contents are bound in place.
    Merge,
}

/// State threaded through one bind call.
pub struct BindContext<'a> {
    options: &'a Options,
    path: FieldPath,
    depth: usize,
    mode: BindMode,
    siblings: Option<Map>,
    /// Source key the next record leaves out of its extra capture.
    reserved_key: Option<&'static str>,
}

impl<'a> BindContext<'a> {
    pub fn new(options: &'a Options, path: FieldPath, mode: BindMode) -> Self {
        Self {
            options,
            path,
            depth: 0,
            mode,
            siblings: None,
            reserved_key: None,
        }
    }

    pub fn options(&self) -> &'a Options {
        self.options
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn mode(&self) -> BindMode {
        self.mode
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Binds a fresh `T` whose top-level record leaves `key` out of its extra field.
    pub(crate) fn bind_reserving<T: Bind + 'static>(
        &mut self,
        value: &Value,
        key: &'static str,
    ) -> Result<T, BindError> {
        self.reserved_key = Some(key);
        let result = self.bind_value::<T>(value);
        self.reserved_key = None;
        result
    }

    /// Binds a fresh `T`, consulting registered converters first.
    pub fn bind_value<T: Bind + 'static>(&mut self, value: &Value) -> Result<T, BindError> {
        if let Some(result) = self.options.converters().from_value::<T>(value) {
            return result.map_err(|e| BindError::custom(&self.path, e));
        }
        self.enter()?;
        let result = T::bind(value, self);
        self.depth -= 1;
        result
    }

    /// Binds into an existing `T`, consulting registered converters first.
    pub fn bind_into<T: Bind + 'static>(
        &mut self,
        target: &mut T,
        value: &Value,
    ) -> Result<(), BindError> {
        if let Some(result) = self.options.converters().from_value::<T>(value) {
            *target = result.map_err(|e| BindError::custom(&self.path, e))?;
            return Ok(());
        }
        self.enter()?;
        let result = target.bind_into(value, self);
        self.depth -= 1;
        result
    }

    fn enter(&mut self) -> Result<(), BindError> {
        if self.depth >= self.options.max_depth() {
            return Err(BindError::structural(
                &self.path,
                format!("nesting deeper than {} levels", self.options.max_depth()),
            ));
        }
        self.depth += 1;
        Ok(())
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

    /// Runs an [`Unmarshal`] hook with the current path and sibling view.
    pub fn unmarshal<U: Unmarshal + ?Sized>(
        &mut self,
        target: &mut U,
        value: &Value,
    ) -> Result<(), BindError> {
        let empty = Map::new();
        let siblings = self.siblings.as_ref().unwrap_or(&empty);
        let hook = HookContext::new(&self.path, siblings);
        target
            .unmarshal(value, &hook)
            .map_err(|e| BindError::custom(&self.path, e))
    }

    /// Binds a source map into a record's fields.
    ///
    /// Ordinary fields are bound first, then deferred (hook) fields with a
    /// generic view of the already-bound siblings, then the extra field
    /// receives every key no other field claimed.
    pub fn bind_record(&mut self, target: &mut dyn Record, value: &Value) -> Result<(), BindError> {
        let descriptor = target.record_descriptor();
        let Value::Map(source) = value else {
            return Err(BindError::type_mismatch(&self.path, "map", value.describe()));
        };
        let plan = RecordPlan::build(descriptor, &self.path)?;
        tracing::trace!(record = descriptor.name, path = %self.path, "binding record");

        let reserved = self.reserved_key.take();
        let outer = self.siblings.take();
        let result = self.bind_planned(target, &plan, source, reserved);
        self.siblings = outer;
        result
    }

    fn bind_planned(
        &mut self,
        target: &mut dyn Record,
        plan: &RecordPlan,
        source: &Map,
        reserved: Option<&str>,
    ) -> Result<(), BindError> {
        let mut deferred = Vec::new();
        for field in &plan.fields {
            if slot_ref(&*target, field, &self.path)?.deferred() {
                deferred.push(field);
                continue;
            }
            self.bind_field(target, field, source)?;
        }

        if !deferred.is_empty() {
            self.siblings = Some(sibling_view(&*target, plan, self.options, &self.path)?);
            tracing::debug!(
                record = target.record_descriptor().name,
                hooks = deferred.len(),
                "running deferred hooks"
            );
            for field in deferred {
                self.bind_field(target, field, source)?;
            }
            self.siblings = None;
        }

        if let Some(extra) = &plan.extra {
            let rest: Map = source
                .iter()
                .filter(|(key, _)| !plan.claims(key) && reserved != Some(key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            let slot = slot_mut(target, extra, &self.path)?;
            self.path.push_field(extra.ident);
            let result = slot
                .bind_slot(&Value::Map(rest), self)
                .map_err(|e| e.at(&self.path, &extra.name));
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn bind_field(
        &mut self,
        target: &mut dyn Record,
        field: &PlannedField,
        source: &Map,
    ) -> Result<(), BindError> {
        let Some(raw) = source.get(&field.name) else {
            if field.tag.required {
                let mut path = self.path.clone();
                path.push_field(field.ident);
                return Err(BindError::Required {
                    path,
                    field: field.name.clone(),
                });
            }
            return Ok(());
        };

        if let Some(expected) = &field.tag.matches
            && !literal_matches(expected, raw)
        {
            let mut path = self.path.clone();
            path.push_field(field.ident);
            return Err(BindError::ValueMismatch {
                path,
                field: field.name.clone(),
                expected: expected.clone(),
                actual: raw.describe(),
            });
        }

        let slot = slot_mut(target, field, &self.path)?;
        if raw.is_null() && keeps_value_on_null(slot.kind()) {
            return Ok(());
        }
        self.path.push_field(field.ident);
        let result = slot
            .bind_slot(raw, self)
            .map_err(|e| e.at(&self.path, &field.name));
        self.path.pop();
        result
    }
}

/// Kinds that have no null representation; a null source leaves them unchanged.
fn keeps_value_on_null(kind: FieldKind) -> bool {
    matches!(
        kind,
        FieldKind::Primitive
            | FieldKind::Record
            | FieldKind::Sequence
            | FieldKind::Mapping
            | FieldKind::Polymorphic
    )
}

fn missing_slot(path: &FieldPath, field: &PlannedField) -> BindError {
    BindError::structural(path, format!("record has no accessor for field `{}`", field.ident))
}

pub(crate) fn slot_ref<'r>(
    record: &'r dyn Record,
    field: &PlannedField,
    path: &FieldPath,
) -> Result<&'r dyn FieldSlot, BindError> {
    field.slot_ref(record).ok_or_else(|| missing_slot(path, field))
}

pub(crate) fn slot_mut<'r>(
    record: &'r mut dyn Record,
    field: &PlannedField,
    path: &FieldPath,
) -> Result<&'r mut dyn FieldSlot, BindError> {
    field.slot_mut(record).ok_or_else(|| missing_slot(path, field))
}

/// Generic view of the bound, non-deferred fields handed to unmarshal hooks.
fn sibling_view(
    target: &dyn Record,
    plan: &RecordPlan,
    options: &Options,
    path: &FieldPath,
) -> Result<Map, BindError> {
    let mut cx = UnbindContext::new(options, path.clone());
    let mut view = Map::new();
    for field in &plan.fields {
        let slot = slot_ref(target, field, path)?;
        if slot.deferred() || !slot.is_present() {
            continue;
        }
        let value = cx.with_field(field.ident, |cx| slot.unbind_slot(cx))?;
        view.insert(field.name.clone(), value);
    }
    Ok(view)
}

/// Short type name used as the root of field paths, e.g. `Config` for `my_app::Config`.
pub(crate) fn root_name<T: ?Sized>() -> &'static str {
    let full = core::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn bind_root<T: Bind + 'static>(
    target: &mut T,
    value: &Value,
    options: &Options,
    mode: BindMode,
) -> Result<(), BindError> {
    let path = FieldPath::new(root_name::<T>());
    if !matches!(value, Value::Map(_)) {
        return Err(BindError::structural(
            &path,
            format!("source must be a map, got {}", value.kind()),
        ));
    }
    tracing::debug!(record = path.root(), ?mode, "binding");
    let mut cx = BindContext::new(options, path, mode);
    cx.bind_into(target, value)
}

/// Binds `value` into a fresh `T::default()`.
pub fn bind<T: Bind + Default + 'static>(value: &Value, options: &Options) -> Result<T, BindError> {
    let mut target = T::default();
    bind_root(&mut target, value, options, BindMode::Fresh)?;
    Ok(target)
}

/// Resets `target` to its default, then binds `value` into it.
pub fn bind_into<T: Bind + Default + 'static>(
    target: &mut T,
    value: &Value,
    options: &Options,
) -> Result<(), BindError> {
    *target = T::default();
    bind_root(target, value, options, BindMode::Fresh)
}

/// Binds `value` over `target`, keeping fields whose keys are absent.
pub fn merge<T: Bind + 'static>(
    target: &mut T,
    value: &Value,
    options: &Options,
) -> Result<(), BindError> {
    bind_root(target, value, options, BindMode::Merge)
}

impl Bind for Value {
    const KIND: FieldKind = FieldKind::Raw;

    fn bind(value: &Value, _cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        Ok(value.clone())
    }
}

impl<T: Bind + 'static> Bind for Option<T> {
    const KIND: FieldKind = FieldKind::Pointer;
    const DEFERRED: bool = T::DEFERRED;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        if value.is_null() {
            return Ok(None);
        }
        cx.bind_value::<T>(value).map(Some)
    }

    fn bind_into(&mut self, value: &Value, cx: &mut BindContext<'_>) -> Result<(), BindError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        match self {
            Some(inner) if cx.mode() == BindMode::Merge => cx.bind_into(inner, value),
            _ => {
                *self = Some(cx.bind_value::<T>(value)?);
                Ok(())
            }
        }
    }
}

impl<T: Bind + 'static> Bind for Box<T> {
    const KIND: FieldKind = FieldKind::Pointer;
    const DEFERRED: bool = T::DEFERRED;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        cx.bind_value::<T>(value).map(Box::new)
    }

    fn bind_into(&mut self, value: &Value, cx: &mut BindContext<'_>) -> Result<(), BindError> {
        cx.bind_into(&mut **self, value)
    }
}

impl<T: Bind + 'static> Bind for Vec<T> {
    const KIND: FieldKind = FieldKind::Sequence;
    const DEFERRED: bool = T::DEFERRED;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        let Value::Array(items) = value else {
            return Err(BindError::type_mismatch(cx.path(), "array", value.describe()));
        };
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            out.push(cx.with_index(index, |cx| cx.bind_value::<T>(item))?);
        }
        Ok(out)
    }
}

fn bind_entries<K, V>(
    value: &Value,
    cx: &mut BindContext<'_>,
    mut insert: impl FnMut(K, V),
) -> Result<(), BindError>
where
    K: MapKey,
    V: Bind + 'static,
{
    let Value::Map(source) = value else {
        return Err(BindError::type_mismatch(cx.path(), "map", value.describe()));
    };
    for (key, item) in source {
        let (key, item) = cx.with_key(key, |cx| {
            let parsed = K::from_key(key, cx.path())?;
            Ok::<_, BindError>((parsed, cx.bind_value::<V>(item)?))
        })?;
        insert(key, item);
    }
    Ok(())
}

impl<K, V, S> Bind for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Bind + 'static,
    S: BuildHasher + Default,
{
    const KIND: FieldKind = FieldKind::Mapping;
    const DEFERRED: bool = V::DEFERRED;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        let mut out = HashMap::default();
        bind_entries(value, cx, |k, v| {
            out.insert(k, v);
        })?;
        Ok(out)
    }
}

impl<K, V> Bind for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Bind + 'static,
{
    const KIND: FieldKind = FieldKind::Mapping;
    const DEFERRED: bool = V::DEFERRED;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        let mut out = BTreeMap::new();
        bind_entries(value, cx, |k, v| {
            out.insert(k, v);
        })?;
        Ok(out)
    }
}

impl<K, V, S> Bind for IndexMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Bind + 'static,
    S: BuildHasher + Default,
{
    const KIND: FieldKind = FieldKind::Mapping;
    const DEFERRED: bool = V::DEFERRED;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        let mut out = IndexMap::default();
        bind_entries(value, cx, |k, v| {
            out.insert(k, v);
        })?;
        Ok(out)
    }
}
