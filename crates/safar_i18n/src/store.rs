use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::label::{Label, Message};
use crate::locale::Locale;
use crate::prefs::PreferenceStore;
use crate::I18nError;

/// Global language store.
static LANGUAGE_STORE: OnceLock<LanguageStore> = OnceLock::new();

/// Global redraw callback - set by the app layer to trigger UI updates
static REDRAW_CALLBACK: Mutex<Option<fn()>> = Mutex::new(None);

/// Set the redraw callback function.
///
/// The app should set this to something like `request_full_rebuild()`.
pub fn set_redraw_callback(callback: fn()) {
    *REDRAW_CALLBACK.lock().unwrap() = Some(callback);
}

fn trigger_redraw() {
    if let Some(cb) = *REDRAW_CALLBACK.lock().unwrap() {
        cb();
    }
}

type Subscriber = Box<dyn Fn(Locale) + Send + Sync>;

struct StoreInner {
    locale: RwLock<Locale>,
    catalogs: RwLock<HashMap<Locale, Catalog>>,
    prefs: Option<Arc<dyn PreferenceStore>>,
    ready: AtomicBool,
    subscribers: Mutex<Vec<Subscriber>>,
}

/// Runtime language state: the active locale, the per-locale catalogs, and
/// the persisted-preference lifecycle.
///
/// Cloning is cheap and clones share state, so background tasks and tests
/// can hold their own handles. The app layer installs one store process-wide
/// with [`LanguageStore::init`]; tests construct isolated instances.
///
/// Lookup never fails: active catalog, then the English catalog, then the
/// key itself verbatim.
#[derive(Clone)]
pub struct LanguageStore {
    inner: Arc<StoreInner>,
}

impl Default for LanguageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageStore {
    /// Store with no preference backend. Starts at [`Locale::DEFAULT`] and
    /// is immediately ready. Used by tests and headless tools.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Store backed by `prefs`. Starts at [`Locale::DEFAULT`]; call
    /// [`load_preference`](Self::load_preference) to pick up the persisted
    /// choice in the background.
    pub fn with_prefs(prefs: impl PreferenceStore + 'static) -> Self {
        Self::with_shared_prefs(Arc::new(prefs))
    }

    pub fn with_shared_prefs(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self::build(Some(prefs))
    }

    fn build(prefs: Option<Arc<dyn PreferenceStore>>) -> Self {
        let ready = prefs.is_none();
        Self {
            inner: Arc::new(StoreInner {
                locale: RwLock::new(Locale::DEFAULT),
                catalogs: RwLock::new(HashMap::new()),
                prefs,
                ready: AtomicBool::new(ready),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Install `store` as the process-wide language store.
    ///
    /// Safe to call multiple times; the first call wins.
    pub fn init(store: LanguageStore) {
        let _ = LANGUAGE_STORE.set(store);
    }

    pub fn get() -> &'static LanguageStore {
        LANGUAGE_STORE
            .get()
            .expect("LanguageStore not initialized. Call LanguageStore::init() at app startup.")
    }

    pub fn try_get() -> Option<&'static LanguageStore> {
        LANGUAGE_STORE.get()
    }

    pub fn locale(&self) -> Locale {
        *self.inner.locale.read().unwrap()
    }

    /// Switch the active locale.
    ///
    /// The in-memory state changes before this returns, so reads in the
    /// same tick already observe the new locale. The preference write is
    /// dispatched fire-and-forget; its failure is logged, never surfaced.
    /// Setting the locale that is already active is a no-op: no write, no
    /// change notification.
    pub fn set_locale(&self, locale: Locale) {
        {
            let mut cur = self.inner.locale.write().unwrap();
            if *cur == locale {
                return;
            }
            debug!("LanguageStore::set_locale: {} -> {}", *cur, locale);
            *cur = locale;
        }
        self.persist_in_background(locale);
        self.notify(locale);
    }

    /// Whether the persisted-preference load has completed (or there is
    /// nothing to load). Consumers never block on this; they render with
    /// the default locale until the load lands.
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }

    /// Start the background read of the persisted preference.
    ///
    /// On completion a recognized tag overwrites the active locale (without
    /// writing it back); anything else, including a read failure, leaves
    /// the default in place. The store becomes ready either way.
    pub fn load_preference(&self) {
        if self.inner.prefs.is_none() {
            self.inner.ready.store(true, Ordering::SeqCst);
            return;
        }
        let store = self.clone();
        let spawned = std::thread::Builder::new()
            .name("safar-i18n-prefs".into())
            .spawn(move || store.run_preference_load());
        if let Err(e) = spawned {
            warn!("could not spawn preference reader: {e}");
            self.inner.ready.store(true, Ordering::SeqCst);
        }
    }

    fn run_preference_load(&self) {
        let prefs = self.inner.prefs.as_ref().expect("checked by caller");
        match prefs.load() {
            Ok(Some(tag)) => match Locale::from_tag(&tag) {
                Some(locale) => self.apply_loaded(locale),
                None => debug!("ignoring unrecognized persisted locale tag `{tag}`"),
            },
            Ok(None) => {}
            Err(e) => warn!("failed to load language preference: {e}"),
        }
        self.inner.ready.store(true, Ordering::SeqCst);
    }

    /// Apply a persisted locale without writing it back.
    fn apply_loaded(&self, locale: Locale) {
        let changed = {
            let mut cur = self.inner.locale.write().unwrap();
            if *cur == locale {
                false
            } else {
                debug!("LanguageStore: persisted preference {} takes effect", locale);
                *cur = locale;
                true
            }
        };
        if changed {
            self.notify(locale);
        }
    }

    /// Dispatch a best-effort preference write on a background thread.
    ///
    /// Nothing waits on the outcome. Under rapid successive switches the
    /// last write to complete wins the file while memory already reflects
    /// the last caller; the divergence closes on the next change.
    fn persist_in_background(&self, locale: Locale) {
        let Some(prefs) = self.inner.prefs.clone() else {
            return;
        };
        let spawned = std::thread::Builder::new()
            .name("safar-i18n-prefs".into())
            .spawn(move || {
                if let Err(e) = prefs.save(locale.tag()) {
                    warn!("failed to persist language preference: {e}");
                }
            });
        if let Err(e) = spawned {
            warn!("could not spawn preference writer: {e}");
        }
    }

    /// Register a callback invoked after every effective locale change.
    pub fn subscribe(&self, f: impl Fn(Locale) + Send + Sync + 'static) {
        self.inner.subscribers.lock().unwrap().push(Box::new(f));
    }

    fn notify(&self, locale: Locale) {
        for sub in self.inner.subscribers.lock().unwrap().iter() {
            sub(locale);
        }
        trigger_redraw();
    }

    /// Load a catalog for a locale, replacing any previous one.
    pub fn load_catalog(&self, locale: Locale, catalog: Catalog) {
        self.inner.catalogs.write().unwrap().insert(locale, catalog);
    }

    /// Parse and load a YAML catalog for a locale.
    pub fn load_catalog_str(&self, locale: Locale, src: &str) -> Result<(), I18nError> {
        let cat = Catalog::parse(src)?;
        self.load_catalog(locale, cat);
        Ok(())
    }

    /// Load the catalogs shipped with the app for every supported locale.
    pub fn load_builtin_catalogs(&self) -> Result<(), I18nError> {
        for locale in Locale::ALL {
            self.load_catalog(locale, Catalog::builtin(locale)?);
        }
        Ok(())
    }

    /// Translate a key: active catalog, then the default catalog, then the
    /// key itself. Total over all string inputs; no side effects.
    pub fn translate(&self, key: &str) -> String {
        let catalogs = self.inner.catalogs.read().unwrap();
        for locale in self.locale().fallback_chain() {
            if let Some(text) = catalogs.get(&locale).and_then(|cat| cat.get(key)) {
                return text.to_string();
            }
        }
        debug!("no translation for key `{key}` in any catalog");
        key.to_string()
    }

    /// Translate a message, filling `{name}` placeholders from its args.
    pub fn tr(&self, msg: &Message) -> String {
        let catalogs = self.inner.catalogs.read().unwrap();
        for locale in self.locale().fallback_chain() {
            if let Some(s) = catalogs
                .get(&locale)
                .and_then(|cat| cat.format_message(msg))
            {
                return s;
            }
        }
        debug!("no translation for key `{}` in any catalog", msg.id);
        msg.id.to_string()
    }

    pub fn resolve_label(&self, label: &Label) -> String {
        match label {
            Label::Raw(s) => s.clone(),
            Label::Msg(m) => self.tr(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::PrefsError;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    /// In-memory preference slot that records write traffic.
    #[derive(Default)]
    struct SpyPrefs {
        stored: Mutex<Option<String>>,
        writes: AtomicUsize,
        fail_load: bool,
        save_delay: Duration,
    }

    impl SpyPrefs {
        fn preloaded(tag: &str) -> Self {
            Self {
                stored: Mutex::new(Some(tag.to_string())),
                ..Default::default()
            }
        }

        fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl PreferenceStore for SpyPrefs {
        fn load(&self) -> Result<Option<String>, PrefsError> {
            if self.fail_load {
                return Err(PrefsError::Io(io::Error::other("storage offline")));
            }
            Ok(self.stored.lock().unwrap().clone())
        }

        fn save(&self, tag: &str) -> Result<(), PrefsError> {
            std::thread::sleep(self.save_delay);
            *self.stored.lock().unwrap() = Some(tag.to_string());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn wait_for(what: &str, cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out waiting for {what}");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn bilingual_store() -> LanguageStore {
        let store = LanguageStore::new();
        store
            .load_catalog_str(Locale::En, "hi: \"Hello\"\nwelcome: \"Welcome\"")
            .unwrap();
        store
            .load_catalog_str(Locale::Ur, "welcome: \"خوش آمدید\"")
            .unwrap();
        store
    }

    #[test]
    fn translate_prefers_active_catalog() {
        let store = bilingual_store();
        store.set_locale(Locale::Ur);
        assert_eq!(store.translate("welcome"), "خوش آمدید");
    }

    #[test]
    fn translate_falls_back_to_default_catalog() {
        // The ur catalog has no `hi`; the en text must show instead.
        let store = bilingual_store();
        store.set_locale(Locale::Ur);
        assert_eq!(store.translate("hi"), "Hello");
    }

    #[test]
    fn translate_returns_key_verbatim_when_unknown() {
        let store = bilingual_store();
        store.set_locale(Locale::Ur);
        assert_eq!(store.translate("bye"), "bye");
    }

    #[test]
    fn translate_is_total_without_catalogs() {
        let store = LanguageStore::new();
        assert_eq!(store.translate("anything_at_all"), "anything_at_all");
        assert_eq!(store.translate(""), "");
    }

    #[test]
    fn tr_fills_placeholders_through_fallback() {
        let store = LanguageStore::new();
        store
            .load_catalog_str(Locale::En, "greeting: \"Hello, {name}!\"")
            .unwrap();
        store.load_catalog(Locale::Ur, Catalog::new());
        store.set_locale(Locale::Ur);

        let s = store.tr(&Message::new("greeting").arg("name", "Asif"));
        assert_eq!(s, "Hello, Asif!");
        assert_eq!(store.tr(&Message::new("absent")), "absent");
    }

    #[test]
    fn resolve_label_passes_raw_text_through() {
        let store = bilingual_store();
        assert_eq!(store.resolve_label(&Label::raw("As is")), "As is");
        assert_eq!(
            store.resolve_label(&Label::msg(Message::new("welcome"))),
            "Welcome"
        );
    }

    #[test]
    fn set_locale_is_idempotent() {
        let spy = Arc::new(SpyPrefs::default());
        let store = LanguageStore::with_shared_prefs(spy.clone());
        let notified = Arc::new(AtomicUsize::new(0));
        let n = notified.clone();
        store.subscribe(move |_| {
            n.fetch_add(1, Ordering::SeqCst);
        });

        store.set_locale(Locale::En); // already active
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(spy.write_count(), 0);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
        assert_eq!(store.locale(), Locale::En);
    }

    #[test]
    fn switch_is_visible_before_persistence_completes() {
        let spy = Arc::new(SpyPrefs {
            save_delay: Duration::from_millis(100),
            ..Default::default()
        });
        let store = LanguageStore::with_shared_prefs(spy.clone());

        store.set_locale(Locale::Ur);
        // The write is still sleeping; memory already moved.
        assert_eq!(store.locale(), Locale::Ur);
        assert_eq!(spy.write_count(), 0);

        wait_for("the preference write", || spy.write_count() == 1);
        assert_eq!(spy.stored.lock().unwrap().as_deref(), Some("ur"));
    }

    #[test]
    fn subscribers_observe_effective_changes() {
        let store = LanguageStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        store.subscribe(move |locale| s.lock().unwrap().push(locale));

        store.set_locale(Locale::Ur);
        store.set_locale(Locale::Ur); // no-op
        store.set_locale(Locale::En);
        assert_eq!(*seen.lock().unwrap(), vec![Locale::Ur, Locale::En]);
    }

    #[test]
    fn back_to_back_switches_keep_the_last_caller() {
        let spy = Arc::new(SpyPrefs::default());
        let store = LanguageStore::with_shared_prefs(spy.clone());

        store.set_locale(Locale::Ur);
        store.set_locale(Locale::En);
        assert_eq!(store.locale(), Locale::En);
        wait_for("both writes to settle", || spy.write_count() == 2);
    }

    #[test]
    fn persisted_preference_loads_in_background() {
        let spy = Arc::new(SpyPrefs::preloaded("ur"));
        let store = LanguageStore::with_shared_prefs(spy);
        assert!(!store.is_ready());
        assert_eq!(store.locale(), Locale::En); // default until the load lands

        store.load_preference();
        wait_for("the preference load", || store.is_ready());
        assert_eq!(store.locale(), Locale::Ur);
    }

    #[test]
    fn applying_a_loaded_preference_writes_nothing_back() {
        let spy = Arc::new(SpyPrefs::preloaded("ur"));
        let store = LanguageStore::with_shared_prefs(spy.clone());
        store.load_preference();
        wait_for("the preference load", || store.is_ready());
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(spy.write_count(), 0);
    }

    #[test]
    fn unrecognized_persisted_tag_leaves_the_default() {
        let spy = Arc::new(SpyPrefs::preloaded("fr"));
        let store = LanguageStore::with_shared_prefs(spy);
        store.load_preference();
        wait_for("the preference load", || store.is_ready());
        assert_eq!(store.locale(), Locale::En);
    }

    #[test]
    fn read_failure_still_reaches_ready() {
        let spy = Arc::new(SpyPrefs {
            fail_load: true,
            ..Default::default()
        });
        let store = LanguageStore::with_shared_prefs(spy);
        store.load_preference();
        wait_for("the preference load", || store.is_ready());
        assert_eq!(store.locale(), Locale::En);
    }

    #[test]
    fn preference_survives_restart() {
        use crate::prefs::FilePrefs;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("language.toml");

        let first = LanguageStore::with_prefs(FilePrefs::new(&path));
        first.set_locale(Locale::Ur);
        wait_for("the write to land", || {
            FilePrefs::new(&path).load().ok().flatten().is_some()
        });

        // Simulated restart: a fresh store over the same slot.
        let second = LanguageStore::with_prefs(FilePrefs::new(&path));
        second.load_preference();
        wait_for("the preference load", || second.is_ready());
        assert_eq!(second.locale(), Locale::Ur);
    }

    #[test]
    fn store_without_prefs_is_ready_immediately() {
        let store = LanguageStore::new();
        assert!(store.is_ready());
        store.load_preference();
        assert!(store.is_ready());
    }
}
