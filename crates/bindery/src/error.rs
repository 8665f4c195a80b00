use crate::path::FieldPath;

/// Error type returned by user-supplied converters, hooks and constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error produced while binding, unbinding or linking.
///
/// Failures inside a record field are wrapped in [`BindError::Binding`]; use
/// [`BindError::kind`] or [`BindError::root_cause`] to inspect the underlying
/// failure regardless of nesting depth.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A field tagged `required` has no key in the source map.
    #[error("required field `{field}` is missing at {path}")]
    Required { path: FieldPath, field: String },

    /// The source value cannot be coerced into the target kind.
    #[error("type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: FieldPath,
        expected: String,
        actual: String,
    },

    /// A field's `match` constraint was not satisfied.
    #[error("value mismatch for `{field}` at {path}: expected {expected}, got {actual}")]
    ValueMismatch {
        path: FieldPath,
        field: String,
        expected: String,
        actual: String,
    },

    /// No constructor is registered for a dynamic type tag.
    #[error("unknown dynamic type `{type_tag}` at {path}")]
    UnknownDynamicType { path: FieldPath, type_tag: String },

    /// A `$ref` id was not found in the linker registry.
    #[error("unresolved reference `{id}` at {path} (looked up `{key}`)")]
    UnresolvedReference {
        path: FieldPath,
        id: String,
        key: String,
    },

    /// The source or target shape is unusable, e.g. a non-map source or two extra fields.
    #[error("{reason} at {path}")]
    Structural { path: FieldPath, reason: String },

    /// A converter, hook or dynamic constructor failed.
    #[error("at {path}: {source}")]
    Custom {
        path: FieldPath,
        #[source]
        source: BoxError,
    },

    /// Failure inside a record field, annotated with the field's external key.
    #[error("field `{field}`: {source}")]
    Binding {
        path: FieldPath,
        field: String,
        #[source]
        source: Box<BindError>,
    },
}

/// Category of a [`BindError`], independent of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Required,
    TypeMismatch,
    ValueMismatch,
    UnknownDynamicType,
    UnresolvedReference,
    Structural,
    Custom,
}

impl BindError {
    pub fn type_mismatch(
        path: &FieldPath,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        BindError::TypeMismatch {
            path: path.clone(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn structural(path: &FieldPath, reason: impl Into<String>) -> Self {
        BindError::Structural {
            path: path.clone(),
            reason: reason.into(),
        }
    }

    /// Wraps a user error. A boxed `BindError` is unwrapped instead of nested.
    pub fn custom(path: &FieldPath, source: BoxError) -> Self {
        match source.downcast::<BindError>() {
            Ok(inner) => *inner,
            Err(source) => BindError::Custom {
                path: path.clone(),
                source,
            },
        }
    }

    /// Wraps this error with the field path and external key it occurred under.
    pub fn at(self, path: &FieldPath, field: impl Into<String>) -> Self {
        BindError::Binding {
            path: path.clone(),
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, with every [`BindError::Binding`] wrapper removed.
    pub fn root_cause(&self) -> &BindError {
        let mut current = self;
        while let BindError::Binding { source, .. } = current {
            current = source;
        }
        current
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BindError::Binding { source, .. } => source.kind(),
            BindError::Required { .. } => ErrorKind::Required,
            BindError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            BindError::ValueMismatch { .. } => ErrorKind::ValueMismatch,
            BindError::UnknownDynamicType { .. } => ErrorKind::UnknownDynamicType,
            BindError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            BindError::Structural { .. } => ErrorKind::Structural,
            BindError::Custom { .. } => ErrorKind::Custom,
        }
    }

    /// Path of the innermost failure.
    pub fn path(&self) -> &FieldPath {
        match self.root_cause() {
            BindError::Required { path, .. }
            | BindError::TypeMismatch { path, .. }
            | BindError::ValueMismatch { path, .. }
            | BindError::UnknownDynamicType { path, .. }
            | BindError::UnresolvedReference { path, .. }
            | BindError::Structural { path, .. }
            | BindError::Custom { path, .. }
            | BindError::Binding { path, .. } => path,
        }
    }

    pub fn is_required(&self) -> bool {
        self.kind() == ErrorKind::Required
    }

    pub fn is_type_mismatch(&self) -> bool {
        self.kind() == ErrorKind::TypeMismatch
    }

    pub fn is_value_mismatch(&self) -> bool {
        self.kind() == ErrorKind::ValueMismatch
    }

    pub fn is_unresolved_reference(&self) -> bool {
        self.kind() == ErrorKind::UnresolvedReference
    }
}
