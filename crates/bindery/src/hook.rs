use core::any::{Any, TypeId};
use core::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::error::BoxError;
use crate::path::FieldPath;
use crate::value::{Map, Value};

/// Custom decoding for a type, run after the other fields of the enclosing record.
///
/// Implement together with [`Marshal`] and `#[derive(Hooked)]` (which also
/// requires `Default`) to plug the type into the engine.
pub trait Unmarshal {
    fn unmarshal(&mut self, value: &Value, cx: &HookContext<'_>) -> Result<(), BoxError>;
}

/// Custom encoding for a type.
pub trait Marshal {
    fn marshal(&self) -> Result<Value, BoxError>;
}

/// What an [`Unmarshal`] hook can see besides its own raw value.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    path: &'a FieldPath,
    siblings: &'a Map,
}

impl<'a> HookContext<'a> {
    pub fn new(path: &'a FieldPath, siblings: &'a Map) -> Self {
        Self { path, siblings }
    }

    pub fn path(&self) -> &'a FieldPath {
        self.path
    }

    /// Generic view of the already-bound sibling fields, keyed by external name.
    pub fn siblings(&self) -> &'a Map {
        self.siblings
    }

    pub fn sibling(&self, name: &str) -> Option<&'a Value> {
        self.siblings.get(name)
    }
}

type FromFn<T> = dyn Fn(&Value) -> Result<T, BoxError> + Send + Sync;
type ToFn<T> = dyn Fn(&T) -> Result<Value, BoxError> + Send + Sync;

struct Converter<T> {
    from: Box<FromFn<T>>,
    to: Box<ToFn<T>>,
}

/// Per-type bidirectional conversion functions.
///
/// A converter registered for exactly `T` takes precedence over both the
/// built-in coercion and any hooks `T` implements.
#[derive(Clone, Default)]
pub struct Converters {
    entries: AHashMap<TypeId, (&'static str, Arc<dyn Any + Send + Sync>)>,
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T, F, G>(&mut self, from_value: F, to_value: G) -> &mut Self
    where
        T: 'static,
        F: Fn(&Value) -> Result<T, BoxError> + Send + Sync + 'static,
        G: Fn(&T) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        let converter = Converter {
            from: Box::new(from_value),
            to: Box::new(to_value),
        };
        self.entries.insert(
            TypeId::of::<T>(),
            (core::any::type_name::<T>(), Arc::new(converter)),
        );
        self
    }

    pub fn with<T, F, G>(mut self, from_value: F, to_value: G) -> Self
    where
        T: 'static,
        F: Fn(&Value) -> Result<T, BoxError> + Send + Sync + 'static,
        G: Fn(&T) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.register(from_value, to_value);
        self
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get<T: 'static>(&self) -> Option<&Converter<T>> {
        if self.entries.is_empty() {
            return None;
        }
        let (_, entry) = self.entries.get(&TypeId::of::<T>())?;
        entry.downcast_ref::<Converter<T>>()
    }

    /// Runs the `from_value` half registered for `T`, if any.
    pub fn from_value<T: 'static>(&self, value: &Value) -> Option<Result<T, BoxError>> {
        self.get::<T>().map(|c| (c.from)(value))
    }

    /// Runs the `to_value` half registered for `T`, if any.
    pub fn to_value<T: 'static>(&self, value: &T) -> Option<Result<Value, BoxError>> {
        self.get::<T>().map(|c| (c.to)(value))
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.values().map(|(name, _)| name))
            .finish()
    }
}
