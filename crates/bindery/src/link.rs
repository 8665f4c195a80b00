use core::any::Any;
use core::fmt;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::{Arc, OnceLock};

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::bind::{Bind, BindContext, root_name};
use crate::error::BindError;
use crate::path::FieldPath;
use crate::record::{FieldKind, Record};
use crate::tag::FieldTag;
use crate::unbind::{Unbind, UnbindContext};
use crate::value::{Map, Value};

/// Key of the reference id inside a pointer map: `{"$ref": "id"}`.
pub const REF_KEY: &str = "$ref";

/// Records that can be the target of a [`Ref`].
///
/// Mark the record with `#[bind(identifiable)]` so the derive registers it
/// with the [`Linker`].
pub trait Identifiable {
    fn identity(&self) -> &str;
}

/// Walks a value graph for the [`Linker`].
///
/// Registration collects identifiable records; resolution fills in every
/// unresolved [`Ref`]. Resolution only needs `&self`, so records owned by an
/// `Arc` resolve in place. Scalars use the no-op defaults.
pub trait Link {
    fn register_refs(&self, _linker: &mut Linker) {}

    fn resolve_refs(&self, _linker: &mut Linker) -> Result<(), BindError> {
        Ok(())
    }

    /// Registers a value owned by `this`. Identifiable records store the
    /// handle itself, so references share the caller's allocation.
    fn register_shared(this: &Arc<Self>, linker: &mut Linker)
    where
        Self: Sized,
    {
        Self::register_refs(&**this, linker);
    }

    /// Root segment of error paths when this value is linked.
    fn link_root(&self) -> &'static str {
        root_name::<Self>()
    }
}

/// A registered target: any linkable value behind an `Arc`.
pub trait Shared: Any + Link + Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Link + Send + Sync> Shared for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

pub type Entry = Arc<dyn Shared>;

/// Recovers the concrete handle of a registry entry.
pub fn downcast_entry<R: Any + Send + Sync>(entry: &Entry) -> Option<Arc<R>> {
    Arc::clone(entry).into_any().downcast::<R>().ok()
}

/// Type a [`Ref`] can resolve to.
///
/// `Arc<R>` shares the registered allocation; an identifiable record type
/// itself (implemented by the derive) receives a clone of it.
pub trait RefTarget: Sized {
    /// Record type name, the first half of registry keys.
    fn target_name() -> &'static str;

    fn from_entry(entry: &Entry) -> Option<Self>;

    fn target_identity(&self) -> &str;
}

impl<R> RefTarget for Arc<R>
where
    R: Record + Identifiable + Link + Send + Sync,
{
    fn target_name() -> &'static str {
        R::descriptor().name
    }

    fn from_entry(entry: &Entry) -> Option<Self> {
        downcast_entry(entry)
    }

    fn target_identity(&self) -> &str {
        self.identity()
    }
}

/// Reference pointer to an identifiable record, bound from `{"$ref": "id"}`.
///
/// Either unresolved (only the raw id is known) or resolved; resolution never
/// goes back. `Ref<Arc<R>>` links may form cycles, which keep their nodes alive.
#[derive(Clone)]
pub struct Ref<T> {
    raw: String,
    target: OnceLock<T>,
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Self {
            raw: String::new(),
            target: OnceLock::new(),
        }
    }
}

/// References compare by id and resolution state, never by target contents.
impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.is_resolved() == other.is_resolved()
    }
}

/// Targets are left out so cyclic graphs can be printed.
impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("raw", &self.raw)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl<T> Ref<T> {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            target: OnceLock::new(),
        }
    }

    pub fn resolved(raw: impl Into<String>, target: T) -> Self {
        Self {
            raw: raw.into(),
            target: OnceLock::from(target),
        }
    }

    pub fn raw_id(&self) -> &str {
        &self.raw
    }

    pub fn get(&self) -> Option<&T> {
        self.target.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.target.get().is_some()
    }
}

impl<T: RefTarget + 'static> Bind for Ref<T> {
    const KIND: FieldKind = FieldKind::Reference;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        match value {
            Value::Null => Ok(Ref::default()),
            Value::Map(map) => match map.get(REF_KEY) {
                Some(Value::String(raw)) => Ok(Ref::new(raw.clone())),
                Some(other) => Err(BindError::type_mismatch(cx.path(), "string `$ref`", other.describe())),
                None => Err(BindError::type_mismatch(cx.path(), "`$ref` map", "map without `$ref`")),
            },
            other => Err(BindError::type_mismatch(cx.path(), "`$ref` map", other.describe())),
        }
    }
}

impl<T: RefTarget> Unbind for Ref<T> {
    fn unbind(&self, _cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        let id = match self.get() {
            Some(target) if self.raw.is_empty() => target.target_identity(),
            _ => self.raw.as_str(),
        };
        if id.is_empty() {
            return Ok(Value::Null);
        }
        let mut map = Map::new();
        map.insert(REF_KEY.to_string(), Value::from(id));
        Ok(Value::Map(map))
    }

    fn is_present(&self) -> bool {
        !self.raw.is_empty() || self.is_resolved()
    }

    fn is_zero(&self) -> bool {
        !self.is_present()
    }
}

/// Only the pointer itself is resolved; its target is never walked, so
/// cycles terminate.
impl<T: RefTarget> Link for Ref<T> {
    fn resolve_refs(&self, linker: &mut Linker) -> Result<(), BindError> {
        linker.resolve(self)
    }
}

/// Two-phase `$ref` resolver.
///
/// [`Linker::register`] records every identifiable record under
/// `"TypeName:identity"`; [`Linker::resolve_references`] then fills each
/// unresolved [`Ref`]. Because resolution only needs registration, forward
/// references and cycles resolve, and `register`/`resolve_references` calls
/// may be interleaved in any order on one linker.
///
/// Records registered by value are stored as copies; register an
/// `Arc<R>` (or a collection of them) to have references share it. Registered
/// copies are resolved too, so chains of references can be followed.
///
/// [`Linker::link`] is one self-contained operation: unless caching is
/// enabled it starts from, and leaves behind, an empty registry. Methods take
/// `&mut self`; share a linker across threads only behind external
/// synchronization.
#[derive(Default)]
pub struct Linker {
    registry: AHashMap<String, Entry>,
    partial: bool,
    cache: bool,
    path: FieldPath,
}

impl Linker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave unknown ids unresolved instead of failing.
    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// Keep the registry across [`Linker::link`] calls.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registry.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Stores `target` under `key` directly; the last write for a key wins.
    pub fn insert(&mut self, key: impl Into<String>, target: Entry) {
        self.registry.insert(key.into(), target);
    }

    /// Stores a shared record under `"TypeName:identity"`.
    pub fn insert_record<R>(&mut self, target: Arc<R>)
    where
        R: Record + Identifiable + Link + Send + Sync,
    {
        let key = registry_key(R::descriptor().name, target.identity());
        self.insert(key, target);
    }

    /// Collects every identifiable record reachable from `target`.
    pub fn register<T: Link + ?Sized>(&mut self, target: &T) {
        let before = self.registry.len();
        target.register_refs(self);
        tracing::debug!(
            registered = self.registry.len() - before,
            total = self.registry.len(),
            "registered link targets"
        );
    }

    /// Resolves every reference reachable from `target` against what has been
    /// registered so far. The registry is kept for later calls.
    pub fn resolve_references<T: Link + ?Sized>(&mut self, target: &mut T) -> Result<(), BindError> {
        self.resolve_registered();
        self.path = FieldPath::new(target.link_root());
        let result = target.resolve_refs(self);
        self.path = FieldPath::default();
        result
    }

    /// Registers all `targets`, then resolves references in all of them.
    pub fn link(&mut self, targets: &mut [&mut dyn Link]) -> Result<(), BindError> {
        if !self.cache {
            self.registry.clear();
        }
        for target in targets.iter() {
            self.register(&**target);
        }
        self.resolve_registered();
        let mut result = Ok(());
        for target in targets.iter() {
            self.path = FieldPath::new(target.link_root());
            result = target.resolve_refs(self);
            if result.is_err() {
                break;
            }
        }
        self.path = FieldPath::default();
        if !self.cache {
            self.registry.clear();
        }
        result
    }

    /// Resolves references inside registered targets. Ids that are not
    /// registered yet are left for a later call.
    fn resolve_registered(&mut self) {
        let entries: Vec<(String, Entry)> = self
            .registry
            .iter()
            .map(|(key, entry)| (key.clone(), Arc::clone(entry)))
            .collect();
        let partial = core::mem::replace(&mut self.partial, true);
        for (key, entry) in &entries {
            self.path = FieldPath::new(key.split(':').next().unwrap_or(key));
            // Cannot fail in partial mode.
            let _ = entry.resolve_refs(self);
        }
        self.partial = partial;
        tracing::trace!(entries = entries.len(), "resolved registered targets");
    }

    /// Resolves one reference against the registry.
    pub fn resolve<T: RefTarget>(&mut self, reference: &Ref<T>) -> Result<(), BindError> {
        if reference.is_resolved() || reference.raw.is_empty() {
            return Ok(());
        }
        let key = registry_key(T::target_name(), &reference.raw);
        match self.registry.get(&key).and_then(T::from_entry) {
            Some(target) => {
                tracing::trace!(key = %key, path = %self.path, "resolved reference");
                // Already set only if another caller won the race; both hold the same target.
                let _ = reference.target.set(target);
                Ok(())
            }
            None if self.partial => Ok(()),
            None => Err(BindError::UnresolvedReference {
                path: self.path.clone(),
                id: reference.raw.clone(),
                key,
            }),
        }
    }

    /// Registers `record` itself, then walks its fields.
    pub fn register_record(&mut self, record: &dyn Record) {
        record.register_identity(self);
        self.register_fields(record);
    }

    /// Registers the shared handle of an identifiable record, then walks its fields.
    pub fn register_shared_record<R>(&mut self, record: &Arc<R>)
    where
        R: Record + Identifiable + Link + Send + Sync,
    {
        self.insert_record(Arc::clone(record));
        self.register_fields(&**record);
    }

    fn register_fields(&mut self, record: &dyn Record) {
        let descriptor = record.record_descriptor();
        for (index, info) in descriptor.fields.iter().enumerate() {
            if FieldTag::parse(info.tag).is_none() {
                continue;
            }
            if info.embedded.is_some() {
                if let Some(embedded) = record.embedded_ref(index) {
                    self.register_record(embedded);
                }
            } else if let Some(slot) = record.field_ref(index) {
                slot.register_slot(self);
            }
        }
    }

    /// Resolves every reference among `record`'s fields.
    pub fn resolve_record(&mut self, record: &dyn Record) -> Result<(), BindError> {
        let descriptor = record.record_descriptor();
        for (index, info) in descriptor.fields.iter().enumerate() {
            if FieldTag::parse(info.tag).is_none() {
                continue;
            }
            self.path.push_field(info.ident);
            let result = if info.embedded.is_some() {
                match record.embedded_ref(index) {
                    Some(embedded) => self.resolve_record(embedded),
                    None => Ok(()),
                }
            } else {
                match record.field_ref(index) {
                    Some(slot) => slot.resolve_slot(self),
                    None => Ok(()),
                }
            };
            self.path.pop();
            result?;
        }
        Ok(())
    }

    pub(crate) fn with_index<R>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push_index(index);
        let result = f(self);
        self.path.pop();
        result
    }

    pub(crate) fn with_key<R>(&mut self, key: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push_key(key);
        let result = f(self);
        self.path.pop();
        result
    }
}

impl fmt::Debug for Linker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.registry.keys().collect();
        keys.sort();
        f.debug_struct("Linker")
            .field("registry", &keys)
            .field("partial", &self.partial)
            .field("cache", &self.cache)
            .finish()
    }
}

pub fn registry_key(type_name: &str, id: &str) -> String {
    format!("{type_name}:{id}")
}

impl Link for Value {}

impl<T: Link> Link for Option<T> {
    fn register_refs(&self, linker: &mut Linker) {
        if let Some(inner) = self {
            inner.register_refs(linker);
        }
    }

    fn resolve_refs(&self, linker: &mut Linker) -> Result<(), BindError> {
        match self {
            Some(inner) => inner.resolve_refs(linker),
            None => Ok(()),
        }
    }
}

impl<T: Link> Link for Box<T> {
    fn register_refs(&self, linker: &mut Linker) {
        (**self).register_refs(linker);
    }

    fn resolve_refs(&self, linker: &mut Linker) -> Result<(), BindError> {
        (**self).resolve_refs(linker)
    }
}

impl<R: Link + Send + Sync + 'static> Link for Arc<R> {
    fn register_refs(&self, linker: &mut Linker) {
        R::register_shared(self, linker);
    }

    fn resolve_refs(&self, linker: &mut Linker) -> Result<(), BindError> {
        (**self).resolve_refs(linker)
    }

    fn link_root(&self) -> &'static str {
        (**self).link_root()
    }
}

impl<T: Link> Link for Vec<T> {
    fn register_refs(&self, linker: &mut Linker) {
        for item in self {
            item.register_refs(linker);
        }
    }

    fn resolve_refs(&self, linker: &mut Linker) -> Result<(), BindError> {
        for (index, item) in self.iter().enumerate() {
            linker.with_index(index, |linker| item.resolve_refs(linker))?;
        }
        Ok(())
    }
}

macro_rules! impl_link_for_map {
    ($map:ident $(, $hasher:ident)?) => {
        impl<K: crate::coerce::MapKey, V: Link $(, $hasher: BuildHasher)?> Link for $map<K, V $(, $hasher)?> {
            fn register_refs(&self, linker: &mut Linker) {
                for item in self.values() {
                    item.register_refs(linker);
                }
            }

            fn resolve_refs(&self, linker: &mut Linker) -> Result<(), BindError> {
                for (key, item) in self.iter() {
                    linker.with_key(&key.to_key(), |linker| item.resolve_refs(linker))?;
                }
                Ok(())
            }
        }
    };
}

impl_link_for_map!(HashMap, S);
impl_link_for_map!(BTreeMap);
impl_link_for_map!(IndexMap, S);
