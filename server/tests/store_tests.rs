use marketjournal_license_server::LicenseStore;
use marketjournal_types::{DeviceId, LicenseKey, ValidationOutcome};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};

fn device(id: &str) -> DeviceId {
    DeviceId::new(id).unwrap()
}

// ── Issue ────────────────────────────────────────────────────────

#[test]
fn issued_keys_are_unbound_and_unique() {
    let store = LicenseStore::open_in_memory().unwrap();
    let keys: HashSet<LicenseKey> = (0..50).map(|_| store.issue().unwrap()).collect();
    assert_eq!(keys.len(), 50);
    assert_eq!(store.count().unwrap(), 50);

    for key in &keys {
        let record = store.get(key).unwrap().unwrap();
        assert!(!record.is_bound());
    }
}

// ── Validate ─────────────────────────────────────────────────────

#[test]
fn unknown_key_is_rejected_without_mutation() {
    let store = LicenseStore::open_in_memory().unwrap();
    let issued = store.issue().unwrap();
    let unknown = LicenseKey::new("never-issued").unwrap();

    let outcome = store.validate(&unknown, &device("dev-A")).unwrap();
    assert_eq!(outcome, ValidationOutcome::UnknownKey);
    assert_eq!(store.count().unwrap(), 1);
    assert!(store.get(&unknown).unwrap().is_none());
    assert!(!store.get(&issued).unwrap().unwrap().is_bound());
}

#[test]
fn first_validation_binds() {
    let store = LicenseStore::open_in_memory().unwrap();
    let key = store.issue().unwrap();

    let outcome = store.validate(&key, &device("dev-A")).unwrap();
    assert_eq!(outcome, ValidationOutcome::Activated);
    assert_eq!(
        store.get(&key).unwrap().unwrap().device_id,
        Some(device("dev-A"))
    );
}

#[test]
fn revalidation_from_same_device_is_idempotent() {
    let store = LicenseStore::open_in_memory().unwrap();
    let key = store.issue().unwrap();
    store.validate(&key, &device("dev-A")).unwrap();

    for _ in 0..3 {
        let outcome = store.validate(&key, &device("dev-A")).unwrap();
        assert_eq!(outcome, ValidationOutcome::AlreadyValid);
    }
    assert_eq!(
        store.get(&key).unwrap().unwrap().device_id,
        Some(device("dev-A"))
    );
}

#[test]
fn other_device_is_rejected_and_binding_kept() {
    let store = LicenseStore::open_in_memory().unwrap();
    let key = store.issue().unwrap();
    store.validate(&key, &device("dev-A")).unwrap();

    let outcome = store.validate(&key, &device("dev-B")).unwrap();
    assert_eq!(outcome, ValidationOutcome::BoundElsewhere);
    assert_eq!(
        store.get(&key).unwrap().unwrap().device_id,
        Some(device("dev-A"))
    );

    // The original device is still accepted afterwards.
    assert_eq!(
        store.validate(&key, &device("dev-A")).unwrap(),
        ValidationOutcome::AlreadyValid
    );
}

#[test]
fn binding_one_key_leaves_others_unbound() {
    let store = LicenseStore::open_in_memory().unwrap();
    let k1 = store.issue().unwrap();
    let k2 = store.issue().unwrap();
    store.validate(&k1, &device("dev-A")).unwrap();

    assert!(!store.get(&k2).unwrap().unwrap().is_bound());
    assert_eq!(
        store.validate(&k2, &device("dev-A")).unwrap(),
        ValidationOutcome::Activated
    );
}

// ── Concurrency ──────────────────────────────────────────────────

#[test]
fn concurrent_first_validations_bind_exactly_once() {
    for _ in 0..20 {
        let store = Arc::new(LicenseStore::open_in_memory().unwrap());
        let key = store.issue().unwrap();
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                let key = key.clone();
                std::thread::spawn(move || {
                    let dev = device(&format!("dev-{i}"));
                    barrier.wait();
                    (dev.clone(), store.validate(&key, &dev).unwrap())
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results
            .iter()
            .filter(|(_, o)| *o == ValidationOutcome::Activated)
            .collect();

        assert_eq!(winners.len(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|(_, o)| *o == ValidationOutcome::BoundElsewhere)
                .count(),
            7
        );
        assert_eq!(
            store.get(&key).unwrap().unwrap().device_id.as_ref(),
            Some(&winners[0].0)
        );
    }
}

#[test]
fn concurrent_validations_on_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LicenseStore::open(dir.path().join("licenses.db")).unwrap());
    let key = store.issue().unwrap();
    let barrier = Arc::new(Barrier::new(2));

    let spawn = |dev: &'static str| {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        let key = key.clone();
        std::thread::spawn(move || {
            barrier.wait();
            store.validate(&key, &device(dev)).unwrap()
        })
    };
    let a = spawn("dev-1");
    let b = spawn("dev-2");
    let mut outcomes = vec![a.join().unwrap(), b.join().unwrap()];
    outcomes.sort_by_key(|o| format!("{o:?}"));

    assert_eq!(
        outcomes,
        vec![ValidationOutcome::Activated, ValidationOutcome::BoundElsewhere]
    );
}

// ── List ─────────────────────────────────────────────────────────

#[test]
fn list_reports_bindings() {
    let store = LicenseStore::open_in_memory().unwrap();
    assert!(store.list().unwrap().is_empty());

    let k1 = store.issue().unwrap();
    let k2 = store.issue().unwrap();
    store.validate(&k1, &device("dev-A")).unwrap();

    let records = store.list().unwrap();
    assert_eq!(records.len(), 2);
    let r1 = records.iter().find(|r| r.license_key == k1).unwrap();
    let r2 = records.iter().find(|r| r.license_key == k2).unwrap();
    assert_eq!(r1.device_id, Some(device("dev-A")));
    assert_eq!(r2.device_id, None);
}
