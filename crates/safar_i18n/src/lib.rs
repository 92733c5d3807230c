//! Safar internationalization (i18n)
//!
//! The language subsystem of the Safar app: active-locale state, bilingual
//! translation catalogs (English/Urdu), and the persisted language
//! preference.
//!
//! - [`Locale`]: closed set of supported languages; English is the fallback
//! - [`Catalog`]: YAML translation tables with `{name}` placeholders
//! - [`LanguageStore`]: runtime locale switching with an app-provided
//!   redraw callback and best-effort background persistence
//!
//! Lookup never fails. `translate` walks the fallback chain (active
//! catalog, then the English catalog) and returns the key verbatim when
//! nothing matches, so every consumer always has displayable text.

mod catalog;
mod error;
mod label;
mod locale;
mod prefs;
mod store;

pub use catalog::{Catalog, CatalogError};
pub use error::I18nError;
pub use label::{Label, Message};
pub use locale::Locale;
pub use prefs::{FilePrefs, PreferenceStore, PrefsError};
pub use store::{set_redraw_callback, LanguageStore};

/// Translate a key using the global [`LanguageStore`].
///
/// If the store isn't initialized, this degrades gracefully and returns
/// the key itself.
pub fn translate(key: &str) -> String {
    match LanguageStore::try_get() {
        Some(store) => store.translate(key),
        None => key.to_string(),
    }
}

/// Translate a label to a displayable string using the global
/// [`LanguageStore`] (borrowed).
///
/// Prefer this overload in hot paths to avoid cloning `Label` values.
pub fn resolve_label_ref(label: &Label) -> String {
    if let Some(store) = LanguageStore::try_get() {
        store.resolve_label(label)
    } else {
        match label {
            Label::Raw(s) => s.clone(),
            Label::Msg(m) => m.id.to_string(),
        }
    }
}

/// Translate a label to a displayable string using the global
/// [`LanguageStore`].
pub fn resolve_label(label: Label) -> String {
    resolve_label_ref(&label)
}

/// Convenience macro for building a translation key + args as a [`Label`].
///
/// Examples:
/// - `t!("welcome_back")`
/// - `t!("greeting", { name: user_name })`
#[macro_export]
macro_rules! t {
    ($id:literal) => {
        $crate::Label::msg($crate::Message::new($id))
    };
    ($id:literal, { $($name:ident : $value:expr),* $(,)? }) => {{
        let mut m = $crate::Message::new($id);
        $(
            m = m.arg(stringify!($name), $value);
        )*
        $crate::Label::msg(m)
    }};
}
