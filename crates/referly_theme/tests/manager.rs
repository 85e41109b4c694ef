use pretty_assertions::assert_eq;
use referly_theme::{
    ColorScheme, DocumentRoot, FileStorage, MemoryStorage, PreferenceStorage, SystemScheme,
    ThemeManager, ThemePreference, DARK_CLASS, THEME_KEY,
};
use std::sync::{Arc, Mutex};

fn setup(system: ColorScheme) -> (ThemeManager, Arc<MemoryStorage>, SystemScheme) {
    let storage = Arc::new(MemoryStorage::new());
    let system = SystemScheme::new(system);
    let manager = ThemeManager::new(storage.clone(), system.clone(), DocumentRoot::new());
    (manager, storage, system)
}

#[test]
fn follows_system_without_persisted_flag() {
    let (manager, _, system) = setup(ColorScheme::Dark);
    assert_eq!(manager.theme(), ThemePreference::Dark);
    assert!(manager.root().has_class(DARK_CLASS));

    system.set(ColorScheme::Light);
    assert_eq!(manager.theme(), ThemePreference::Light);
    assert!(!manager.is_dark());

    system.set(ColorScheme::Dark);
    assert_eq!(manager.theme(), ThemePreference::Dark);
    assert!(manager.is_dark());
}

#[test]
fn explicit_dark_ignores_system_changes() {
    let (manager, storage, system) = setup(ColorScheme::Light);

    manager.set_theme(ThemePreference::Dark);
    assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    assert!(manager.is_dark());

    system.set(ColorScheme::Dark);
    system.set(ColorScheme::Light);
    assert!(manager.is_dark());
    assert_eq!(manager.theme(), ThemePreference::Dark);
    assert!(!manager.is_following_system());
}

#[test]
fn system_choice_clears_flag_and_applies_os_scheme() {
    let (manager, storage, system) = setup(ColorScheme::Light);
    manager.set_theme(ThemePreference::Light);
    system.set(ColorScheme::Dark);
    assert!(!manager.is_dark());

    manager.set_theme(ThemePreference::System);
    assert_eq!(storage.get(THEME_KEY).unwrap(), None);
    assert!(manager.is_dark());
    assert_eq!(manager.theme(), ThemePreference::System);

    // following resumes; the reported value becomes the concrete scheme
    system.set(ColorScheme::Light);
    assert!(!manager.is_dark());
    assert_eq!(manager.theme(), ThemePreference::Light);
}

#[test]
fn dropping_manager_releases_system_listener() {
    let (manager, _, system) = setup(ColorScheme::Light);
    assert_eq!(system.listener_count(), 1);

    let root = manager.root().clone();
    drop(manager);
    assert_eq!(system.listener_count(), 0);

    system.set(ColorScheme::Dark);
    assert!(!root.is_dark());
}

#[test]
fn subscribers_see_reported_theme() {
    let (manager, _, system) = setup(ColorScheme::Light);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_clone = Arc::clone(&seen);
    let _sub = manager.subscribe(move |theme| seen_clone.lock().unwrap().push(*theme));

    system.set(ColorScheme::Dark);
    manager.set_theme(ThemePreference::Light);
    manager.set_theme(ThemePreference::System);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ThemePreference::Dark,
            ThemePreference::Light,
            ThemePreference::System,
        ]
    );
}

#[test]
fn file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let system = SystemScheme::new(ColorScheme::Light);

    {
        let manager = ThemeManager::new(
            Arc::new(FileStorage::new(dir.path())),
            system.clone(),
            DocumentRoot::new(),
        );
        manager.set_theme(ThemePreference::Dark);
    }

    let restarted = ThemeManager::new(
        Arc::new(FileStorage::new(dir.path())),
        system.clone(),
        DocumentRoot::new(),
    );
    assert_eq!(restarted.theme(), ThemePreference::Dark);
    assert!(restarted.is_dark());
    assert!(!restarted.is_following_system());
    assert_eq!(restarted.system_theme(), ThemePreference::Dark);
}

#[test]
fn unwritable_preferences_keep_explicit_choice() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    std::fs::write(storage.path(), "theme = [").unwrap();

    let system = SystemScheme::new(ColorScheme::Light);
    let manager = ThemeManager::new(Arc::new(storage), system.clone(), DocumentRoot::new());
    assert!(manager.is_following_system());

    manager.set_theme(ThemePreference::Dark);
    assert!(manager.is_dark());
    assert!(!manager.is_following_system());
    assert_eq!(system.listener_count(), 0);

    system.set(ColorScheme::Dark);
    system.set(ColorScheme::Light);
    assert!(manager.is_dark());
    assert_eq!(manager.theme(), ThemePreference::Dark);
}
