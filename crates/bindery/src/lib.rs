//! Bidirectional binding between typed Rust records and generic [`Value`]s.
//!
//! A record derives [`Bindable`] and can then be populated from a [`Value`]
//! map ([`bind`], [`merge`]), turned back into one ([`unbind`]) and have its
//! `$ref` pointers resolved by a [`Linker`].
//!
//! ```
//! use bindery::{Bindable, Options, value};
//!
//! #[derive(Debug, Default, PartialEq, Bindable)]
//! struct User {
//!     #[bind(tag = "name,required")]
//!     name: String,
//!     age: i64,
//!     active: bool,
//! }
//!
//! let user: User = bindery::bind(&value!({ "name": "John Doe", "age": 30 }), &Options::new()).unwrap();
//! assert_eq!(user, User { name: "John Doe".into(), age: 30, active: false });
//! ```

extern crate self as bindery;

/// Generic container value model.
pub mod value;

/// Field paths used for diagnostics and scoped registries.
pub mod path;

/// Per-field annotation parsing.
pub mod tag;

/// Scalar coercion between generic values and primitive types.
pub mod coerce;

/// Duration literal parsing and formatting.
pub mod duration;

/// Custom converters and marshal/unmarshal hooks.
pub mod hook;

/// Discriminator-based polymorphic values.
pub mod dynamic;

/// Record descriptors and field slots.
pub mod record;

/// Binding generic values into typed records.
pub mod bind;

/// Unbinding typed records into generic values.
pub mod unbind;

/// Two-phase reference resolution.
pub mod link;

/// Engine options.
pub mod options;

/// Error types.
pub mod error;

pub use bind::{Bind, BindContext, BindMode, bind, bind_into, merge};
pub use bindery_macros::{Bindable, Hooked};
pub use dynamic::{Dynamic, DynamicRegistry};
pub use error::{BindError, BoxError, ErrorKind};
pub use hook::{Converters, HookContext, Marshal, Unmarshal};
pub use link::{Identifiable, Link, Linker, Ref};
pub use options::Options;
pub use path::FieldPath;
pub use record::{FieldKind, Record};
pub use tag::FieldTag;
pub use unbind::{Unbind, UnbindContext, unbind, unbind_value};
pub use value::{Map, Number, Value, ValueKind};

/// Items referenced by code generated from `#[derive(Bindable)]` and `#[derive(Hooked)]`.
#[doc(hidden)]
pub mod __private {
    pub use crate::record::{FieldInfo, FieldSlot, RecordDescriptor};
    pub use crate::link::{Entry as LinkEntry, RefTarget, downcast_entry};
    pub use std::sync::Arc;
}
