use convert_case::{Case, Casing as _};
use darling::FromMeta;

/// Accepted `rename_all` spellings, as serde spells them.
const RULES: &[(&str, Case<'static>)] = &[
    ("lowercase", Case::Flat),
    ("UPPERCASE", Case::UpperFlat),
    ("PascalCase", Case::Pascal),
    ("camelCase", Case::Camel),
    ("snake_case", Case::Snake),
    ("SCREAMING_SNAKE_CASE", Case::UpperSnake),
    ("kebab-case", Case::Kebab),
    ("SCREAMING-KEBAB-CASE", Case::Cobol),
];

/// Container-level rule renaming every record field or enum variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameAll(Case<'static>);

impl RenameAll {
    pub fn apply(self, name: &str) -> String {
        name.to_case(self.0)
    }
}

impl FromMeta for RenameAll {
    fn from_string(value: &str) -> darling::Result<Self> {
        RULES
            .iter()
            .find(|(spelling, _)| *spelling == value)
            .map(|(_, case)| RenameAll(*case))
            .ok_or_else(|| darling::Error::unknown_value(value))
    }
}
