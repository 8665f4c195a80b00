use core::fmt;

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Record field, by Rust identifier.
    Field(String),
    /// Sequence element.
    Index(usize),
    /// Map entry.
    Key(String),
}

/// Location of a field inside a record graph, e.g. `Config.items[2].action`.
///
/// The root is the top-level record type name. Field segments use Rust field
/// identifiers rather than external names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    root: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: Vec::new(),
        }
    }

    /// Parses the dotted form used when registering scoped dynamic types.
    ///
    /// `Root.items[0].action` and `Root.items.action` produce paths that are
    /// equal after [`FieldPath::without_indices`].
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split('.');
        let mut path = FieldPath::new(parts.next().map(strip_brackets).unwrap_or_default());
        for part in parts {
            path.push_field(strip_brackets(part));
        }
        path
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn push_field(&mut self, ident: impl Into<String>) {
        self.segments.push(PathSegment::Field(ident.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Same path with every index and map-key segment removed.
    pub fn without_indices(&self) -> FieldPath {
        FieldPath {
            root: self.root.clone(),
            segments: self
                .segments
                .iter()
                .filter(|s| matches!(s, PathSegment::Field(_)))
                .cloned()
                .collect(),
        }
    }
}

fn strip_brackets(part: &str) -> &str {
    part.find('[').map_or(part, |i| &part[..i])
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 && self.root.is_empty() => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}
