use crate::dynamic::DynamicRegistry;
use crate::hook::Converters;

/// Default ceiling on nested values before binding gives up.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Everything a bind or unbind call needs besides the data itself.
///
/// Read-only during a call, so one `Options` can be shared across threads.
#[derive(Debug, Clone)]
pub struct Options {
    converters: Converters,
    dynamic: DynamicRegistry,
    max_depth: usize,
    redact_secrets: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            converters: Converters::default(),
            dynamic: DynamicRegistry::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            redact_secrets: false,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_converters(mut self, converters: Converters) -> Self {
        self.converters = converters;
        self
    }

    pub fn with_dynamic(mut self, dynamic: DynamicRegistry) -> Self {
        self.dynamic = dynamic;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace `secret` fields with `"<redacted>"` when unbinding.
    pub fn with_redact_secrets(mut self, redact: bool) -> Self {
        self.redact_secrets = redact;
        self
    }

    pub fn converters(&self) -> &Converters {
        &self.converters
    }

    pub fn converters_mut(&mut self) -> &mut Converters {
        &mut self.converters
    }

    pub fn dynamic(&self) -> &DynamicRegistry {
        &self.dynamic
    }

    pub fn dynamic_mut(&mut self) -> &mut DynamicRegistry {
        &mut self.dynamic
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn redact_secrets(&self) -> bool {
        self.redact_secrets
    }
}
