use marketjournal_collect::{ApiKeyStore, JournalError};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use tempfile::TempDir;

fn store(dir: &TempDir) -> ApiKeyStore {
    ApiKeyStore::new(dir.path().join("api_key"), dir.path().join("encryption_key"))
}

#[test]
fn explicit_key_wins_and_is_not_stored() {
    let dir = TempDir::new().unwrap();
    let keys = store(&dir);

    let key = keys
        .resolve(Some(" from-env ".into()), || panic!("must not prompt"))
        .unwrap();

    assert_eq!(key, "from-env");
    assert_eq!(keys.load().unwrap(), None);
}

#[test]
fn prompted_key_is_stored_and_reused() {
    let dir = TempDir::new().unwrap();
    let keys = store(&dir);
    let asked = Cell::new(0);

    let first = keys
        .resolve(None, || {
            asked.set(asked.get() + 1);
            Ok(Some("typed-key".into()))
        })
        .unwrap();
    let second = keys
        .resolve(None, || {
            asked.set(asked.get() + 1);
            Ok(None)
        })
        .unwrap();

    assert_eq!(first, "typed-key");
    assert_eq!(second, "typed-key");
    assert_eq!(asked.get(), 1);
    let on_disk = std::fs::read_to_string(dir.path().join("api_key")).unwrap();
    assert!(!on_disk.contains("typed-key"));
}

#[test]
fn blank_answer_is_missing_key() {
    let dir = TempDir::new().unwrap();
    let err = store(&dir)
        .resolve(Some("  ".into()), || Ok(Some("   ".into())))
        .unwrap_err();
    assert!(matches!(err, JournalError::MissingApiKey("FMP")));
}

#[test]
fn unreadable_stored_key_prompts_again() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("api_key"), "garbage").unwrap();

    let key = store(&dir)
        .resolve(None, || Ok(Some("fresh".into())))
        .unwrap();
    assert_eq!(key, "fresh");
}
