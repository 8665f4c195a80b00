/// Output settings for JSON rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Indent nested values.
    pub pretty: bool,
}

impl Config {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}
