use std::fmt;

/// A display language supported by the app.
///
/// The set is closed: string tags exist only at the persistence and
/// catalog-file boundary, and [`Locale::from_tag`] is the single place an
/// untrusted tag becomes a `Locale`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    /// English. The default, and the fallback for missing translations.
    #[default]
    En,
    /// Urdu.
    Ur,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ur];

    /// The locale every store starts in before a persisted preference loads.
    pub const DEFAULT: Locale = Locale::En;

    /// Stable tag used in the preference record and catalog file names.
    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ur => "ur",
        }
    }

    /// Parse a persisted tag. Unrecognized tags return `None` and the
    /// caller falls back to [`Locale::DEFAULT`].
    pub fn from_tag(tag: &str) -> Option<Locale> {
        match tag.trim() {
            "en" => Some(Locale::En),
            "ur" => Some(Locale::Ur),
            _ => None,
        }
    }

    /// Lookup order for translation: the locale itself, then the default.
    pub fn fallback_chain(self) -> impl Iterator<Item = Locale> {
        let second = (self != Locale::DEFAULT).then_some(Locale::DEFAULT);
        std::iter::once(self).chain(second)
    }

    /// The language's name in that language, as shown by the language picker.
    pub fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Ur => "اردو",
        }
    }

    /// Urdu is written right-to-left; layout flips accordingly.
    pub fn is_rtl(self) -> bool {
        matches!(self, Locale::Ur)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
