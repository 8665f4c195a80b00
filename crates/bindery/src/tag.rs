/// Parsed form of a per-field annotation string such as `"name,required,omitempty"`.
///
/// Grammar: comma-separated tokens. The first token, unless it is empty or a
/// flag keyword, overrides the external name. Recognised flags are
/// `required`, `secret`, `omitempty`/`+omitempty`, `extra`/`+extra` and
/// `match=<value>` where the value may be double-quoted to contain commas.
/// Unknown tokens are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTag {
    pub name: Option<String>,
    pub required: bool,
    pub secret: bool,
    pub omit_empty: bool,
    pub extra: bool,
    /// Literal the raw source value must equal.
    pub matches: Option<String>,
}

impl FieldTag {
    /// Parses a raw tag. Returns `None` for `-`, which marks the field as skipped.
    ///
    /// Never fails: malformed `match` tokens are dropped.
    pub fn parse(raw: &str) -> Option<FieldTag> {
        let raw = raw.trim();
        if raw == "-" {
            return None;
        }
        let mut tag = FieldTag::default();
        if raw.is_empty() {
            return Some(tag);
        }
        for (i, token) in tokenize(raw).into_iter().enumerate() {
            let token = token.trim();
            if tag.apply_flag(token) {
                continue;
            }
            if i == 0 && !token.is_empty() {
                tag.name = Some(token.to_string());
            }
        }
        Some(tag)
    }

    /// Whether a `match` constraint is present.
    pub fn has_match(&self) -> bool {
        self.matches.is_some()
    }

    /// External key for a field with the given Rust identifier.
    pub fn external_name(&self, ident: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => to_snake_case(ident.trim_start_matches("r#")),
        }
    }

    fn apply_flag(&mut self, token: &str) -> bool {
        match token {
            "required" => self.required = true,
            "secret" => self.secret = true,
            "omitempty" | "+omitempty" => self.omit_empty = true,
            "extra" | "+extra" => self.extra = true,
            _ if is_match_token(token) => self.matches = parse_match(token),
            _ => return false,
        }
        true
    }
}

fn is_match_token(token: &str) -> bool {
    token
        .strip_prefix("match")
        .is_some_and(|rest| rest.is_empty() || rest.trim_start().starts_with('='))
}

fn parse_match(token: &str) -> Option<String> {
    let value = token.strip_prefix("match")?.trim_start().strip_prefix('=')?.trim();
    match value.strip_prefix('"') {
        Some(quoted) => quoted.strip_suffix('"').map(str::to_string),
        None => Some(value.to_string()),
    }
}

/// Splits on commas outside double quotes.
///
/// When a quote is never closed, the remainder after the opening token is
/// split plainly so that later flags still apply.
fn tokenize(raw: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    for (i, c) in raw.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            ',' if !in_quote => {
                tokens.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    let rest = &raw[start..];
    if in_quote {
        tokens.extend(rest.split(','));
    } else {
        tokens.push(rest);
    }
    tokens
}

/// Converts a Rust or CamelCase identifier into snake_case.
///
/// Acronym runs stay together: `HTMLParser` becomes `html_parser` and
/// `UserID` becomes `user_id`. Applying it to its own output is a no-op.
pub fn to_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
