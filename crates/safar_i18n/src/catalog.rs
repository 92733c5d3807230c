use std::borrow::Cow;
use std::collections::HashMap;

use thiserror::Error;

use crate::label::Message;
use crate::locale::Locale;

const MAX_CATALOG_ENTRIES: usize = 10_000;
const MAX_KEY_BYTES: usize = 128;
const MAX_VALUE_BYTES: usize = 16 * 1024;

fn is_valid_key(key: &str) -> bool {
    let mut it = key.chars();
    match it.next() {
        Some(c) if c.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    it.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

/// Translation table for one locale: `key -> display text`.
///
/// Parsed from a YAML mapping with string keys and string values. Values
/// may contain `{name}` placeholders that are filled from [`Message`]
/// arguments; `{{` and `}}` escape literal braces.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Parse a YAML mapping catalog.
    pub fn parse(src: &str) -> Result<Self, CatalogError> {
        let raw: serde_yaml::Value =
            serde_yaml::from_str(src).map_err(|e| CatalogError::Yaml(e.to_string()))?;
        let serde_yaml::Value::Mapping(map) = raw else {
            return Err(CatalogError::NotAMapping);
        };

        if map.len() > MAX_CATALOG_ENTRIES {
            return Err(CatalogError::TooManyEntries(MAX_CATALOG_ENTRIES));
        }

        let mut cat = Self::new();
        for (k, v) in map {
            let Some(key) = k.as_str() else {
                return Err(CatalogError::Yaml("keys must be strings".to_string()));
            };
            if !is_valid_key(key) || key.len() > MAX_KEY_BYTES {
                return Err(CatalogError::InvalidKey(key.to_string()));
            }
            let Some(val) = v.as_str() else {
                return Err(CatalogError::NonStringValue(key.to_string()));
            };
            if val.len() > MAX_VALUE_BYTES {
                return Err(CatalogError::ValueTooLarge(key.to_string()));
            }
            cat.insert(key, val);
        }
        Ok(cat)
    }

    /// The catalog shipped with the app for `locale`.
    pub fn builtin(locale: Locale) -> Result<Self, CatalogError> {
        let src = match locale {
            Locale::En => include_str!("../locales/en.yaml"),
            Locale::Ur => include_str!("../locales/ur.yaml"),
        };
        Self::parse(src)
    }

    /// Look up a message's template and fill its placeholders.
    pub fn format_message(&self, msg: &Message) -> Option<String> {
        let tmpl = self.get(msg.id.as_ref())?;
        Some(fill_placeholders(tmpl, &msg.args))
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not a yaml mapping")]
    NotAMapping,

    #[error("yaml catalog error: {0}")]
    Yaml(String),

    #[error("invalid catalog key `{0}` (allowed: [A-Za-z0-9][A-Za-z0-9_.-]*, max 128 bytes)")]
    InvalidKey(String),

    #[error("catalog value for `{0}` must be a string")]
    NonStringValue(String),

    #[error("catalog value for `{0}` is too large")]
    ValueTooLarge(String),

    #[error("too many catalog entries (max {0})")]
    TooManyEntries(usize),
}

/// Replace `{name}` tokens with argument values.
///
/// Unknown placeholders stay visible so missing args are noticed during
/// development. An unclosed `{` keeps the rest of the template literal.
fn fill_placeholders(tmpl: &str, args: &[(Cow<'static, str>, String)]) -> String {
    if !tmpl.contains('{') && !tmpl.contains('}') {
        return tmpl.to_string();
    }

    let mut out = String::with_capacity(tmpl.len() + 8);
    let mut chars = tmpl.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                if !closed {
                    out.push('{');
                    out.push_str(&name);
                    break;
                }
                let name = name.trim();
                match args.iter().find(|(k, _)| *k == name) {
                    Some((_, v)) => out.push_str(v),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
            }
            _ => out.push(c),
        }
    }

    out
}
