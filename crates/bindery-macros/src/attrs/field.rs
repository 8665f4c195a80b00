use darling::FromField;

#[derive(Debug, Default, FromField)]
#[darling(default, attributes(bind))]
pub struct FieldAttrs {
    /// Raw field tag, e.g. `"name,required"`.
    pub tag: Option<String>,
    /// Promote the nested record's fields into this one.
    pub embed: bool,
    /// Same as `tag = "-"`.
    pub skip: bool,
}

impl FieldAttrs {
    /// The tag carried into the descriptor.
    pub fn raw_tag(&self) -> &str {
        if self.skip {
            "-"
        } else {
            self.tag.as_deref().unwrap_or("")
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.raw_tag().trim() == "-"
    }
}
