use core::any::Any;
use core::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::bind::{Bind, BindContext};
use crate::error::{BindError, BoxError};
use crate::link::{Link, Linker};
use crate::path::FieldPath;
use crate::record::FieldKind;
use crate::unbind::{Unbind, UnbindContext};
use crate::value::{Map, Value};

/// Discriminator key of polymorphic maps.
pub const TYPE_KEY: &str = "type";

/// Upcast helper so `dyn Dynamic` values can be downcast.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A value whose concrete type is chosen at bind time from its `"type"` key.
///
/// Records deriving `Bindable` get [`Unbind`] and [`Link`] for free, so usually
/// only [`Dynamic::type_tag`] has to be written.
pub trait Dynamic: AsAny + Unbind + Link + Send + Sync + fmt::Debug {
    /// Discriminator written back under `"type"` when unbinding.
    fn type_tag(&self) -> &str;

    /// Generic form of the value, without the discriminator.
    fn to_map(&self, cx: &mut UnbindContext<'_>) -> Result<Map, BindError> {
        match self.unbind(cx)? {
            Value::Map(map) => Ok(map),
            other => Err(BindError::type_mismatch(cx.path(), "map", other.describe())),
        }
    }
}

impl dyn Dynamic {
    pub fn is<T: Dynamic>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Dynamic>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Dynamic>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

/// Builds a dynamic value from its full source map (including `"type"`).
pub type Constructor =
    Arc<dyn Fn(&Value, &mut BindContext<'_>) -> Result<Box<dyn Dynamic>, BindError> + Send + Sync>;

/// Constructors keyed by type tag, globally and per field path.
///
/// Scoped registrations are keyed by the field path with indices removed
/// (`Workflow.steps.action`) and are consulted before global ones.
#[derive(Clone, Default)]
pub struct DynamicRegistry {
    global: AHashMap<String, Constructor>,
    scoped: AHashMap<String, AHashMap<String, Constructor>>,
}

fn typed_constructor<T: Bind + Dynamic>() -> Constructor {
    Arc::new(|value: &Value, cx: &mut BindContext<'_>| {
        Ok(Box::new(cx.bind_reserving::<T>(value, TYPE_KEY)?) as Box<dyn Dynamic>)
    })
}

fn fn_constructor<F>(f: F) -> Constructor
where
    F: Fn(&Map, &mut BindContext<'_>) -> Result<Box<dyn Dynamic>, BoxError> + Send + Sync + 'static,
{
    Arc::new(move |value: &Value, cx: &mut BindContext<'_>| {
        let empty = Map::new();
        let map = value.as_map().unwrap_or(&empty);
        f(map, cx).map_err(|e| BindError::custom(cx.path(), e))
    })
}

impl DynamicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`, bound through the engine, under `tag`.
    pub fn register<T: Bind + Dynamic>(&mut self, tag: impl Into<String>) -> &mut Self {
        self.global.insert(tag.into(), typed_constructor::<T>());
        self
    }

    pub fn register_fn<F>(&mut self, tag: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Map, &mut BindContext<'_>) -> Result<Box<dyn Dynamic>, BoxError> + Send + Sync + 'static,
    {
        self.global.insert(tag.into(), fn_constructor(f));
        self
    }

    /// Registers `T` under `tag` for the field at `path` only, e.g. `"Workflow.steps.action"`.
    pub fn register_at<T: Bind + Dynamic>(
        &mut self,
        path: &str,
        tag: impl Into<String>,
    ) -> &mut Self {
        self.scope(path).insert(tag.into(), typed_constructor::<T>());
        self
    }

    pub fn register_fn_at<F>(&mut self, path: &str, tag: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Map, &mut BindContext<'_>) -> Result<Box<dyn Dynamic>, BoxError> + Send + Sync + 'static,
    {
        self.scope(path).insert(tag.into(), fn_constructor(f));
        self
    }

    pub fn with<T: Bind + Dynamic>(mut self, tag: impl Into<String>) -> Self {
        self.register::<T>(tag);
        self
    }

    pub fn with_at<T: Bind + Dynamic>(mut self, path: &str, tag: impl Into<String>) -> Self {
        self.register_at::<T>(path, tag);
        self
    }

    fn scope(&mut self, path: &str) -> &mut AHashMap<String, Constructor> {
        let key = FieldPath::parse(path).without_indices().to_string();
        self.scoped.entry(key).or_default()
    }

    /// Finds the constructor for `tag` at `path`, scoped registrations first.
    pub fn lookup(&self, path: &FieldPath, tag: &str) -> Option<&Constructor> {
        if !self.scoped.is_empty() {
            let key = path.without_indices().to_string();
            if let Some(found) = self.scoped.get(&key).and_then(|scope| scope.get(tag)) {
                return Some(found);
            }
        }
        self.global.get(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.scoped.is_empty()
    }
}

impl fmt::Debug for DynamicRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scoped: Vec<(&String, Vec<&String>)> = self
            .scoped
            .iter()
            .map(|(path, tags)| (path, tags.keys().collect()))
            .collect();
        scoped.sort();
        let mut global: Vec<&String> = self.global.keys().collect();
        global.sort();
        f.debug_struct("DynamicRegistry")
            .field("global", &global)
            .field("scoped", &scoped)
            .finish()
    }
}

/// Resolves and runs the constructor for a polymorphic map.
pub fn resolve(value: &Value, cx: &mut BindContext<'_>) -> Result<Box<dyn Dynamic>, BindError> {
    let Some(map) = value.as_map() else {
        return Err(BindError::type_mismatch(cx.path(), "map", value.describe()));
    };
    let tag = match map.get(TYPE_KEY) {
        Some(Value::String(tag)) if !tag.is_empty() => tag.as_str(),
        Some(other) => {
            return Err(BindError::type_mismatch(
                cx.path(),
                "non-empty string `type`",
                other.describe(),
            ));
        }
        None => {
            return Err(BindError::type_mismatch(
                cx.path(),
                "non-empty string `type`",
                "missing",
            ));
        }
    };
    let Some(constructor) = cx.options().dynamic().lookup(cx.path(), tag).cloned() else {
        return Err(BindError::UnknownDynamicType {
            path: cx.path().clone(),
            type_tag: tag.to_string(),
        });
    };
    tracing::trace!(path = %cx.path(), type_tag = tag, "resolving dynamic value");
    constructor(value, cx)
}

impl Bind for Box<dyn Dynamic> {
    const KIND: FieldKind = FieldKind::Polymorphic;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        resolve(value, cx)
    }
}

impl Unbind for Box<dyn Dynamic> {
    fn unbind(&self, cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        let mut map = (**self).to_map(cx)?;
        let tag = Value::String(self.type_tag().to_string());
        match map.get_mut(TYPE_KEY) {
            Some(existing) => *existing = tag,
            None => {
                map.shift_insert(0, TYPE_KEY.to_string(), tag);
            }
        }
        Ok(Value::Map(map))
    }
}

impl Link for Box<dyn Dynamic> {
    fn register_refs(&self, linker: &mut Linker) {
        (**self).register_refs(linker);
    }

    fn resolve_refs(&self, linker: &mut Linker) -> Result<(), BindError> {
        (**self).resolve_refs(linker)
    }
}
