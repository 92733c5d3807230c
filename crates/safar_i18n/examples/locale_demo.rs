//! Locale switching demo (headless)
//!
//! Shows the store lifecycle end to end: load the built-in catalogs, pick
//! up the persisted preference, translate, switch, and let the background
//! write land. Run it twice to see the chosen language survive a restart.
//!
//! Run with:
//! `cargo run -p safar_i18n --example locale_demo`

use std::time::Duration;

use safar_i18n::{resolve_label, t, FilePrefs, LanguageStore, Locale};

fn main() -> Result<(), safar_i18n::I18nError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let prefs_path = std::env::temp_dir().join("safar-demo").join("language.toml");
    let store = LanguageStore::with_prefs(FilePrefs::new(&prefs_path));
    store.load_builtin_catalogs()?;
    store.subscribe(|locale| println!("-- language changed to {}", locale.native_name()));
    LanguageStore::init(store.clone());

    store.load_preference();
    while !store.is_ready() {
        std::thread::sleep(Duration::from_millis(5));
    }
    println!(
        "active locale: {} (preference file: {})",
        store.locale(),
        prefs_path.display()
    );

    print_screen(&store);

    let next = if store.locale() == Locale::En {
        Locale::Ur
    } else {
        Locale::En
    };
    store.set_locale(next);
    print_screen(&store);

    // Give the fire-and-forget preference write a moment to land before
    // the process exits.
    std::thread::sleep(Duration::from_millis(100));
    Ok(())
}

fn print_screen(store: &LanguageStore) {
    println!("{}", resolve_label(t!("welcome_back")));
    println!("{}", store.translate("explore_jobs"));
    println!("{}", store.translate("visa_timeline"));
    println!("{}", store.translate("salary_calculator"));
}
