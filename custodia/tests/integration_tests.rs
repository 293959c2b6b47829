//! Integration tests for custodia with FileKeyProvider.

use custodia::audit::{
    AuditAction, AuditContext, AuditRecorder, Audited, EntityStore, MemoryAuditSink,
    RequestOrigin,
};
use custodia::cipher::FieldCipher;
use custodia::error::ConfigurationError;
use custodia::identity::{display_identifier, seal};
use custodia::normalize::normalize;
use custodia::permission::{
    validate_action_registry, ActionCode, ActionRecord, InMemoryAccessStore, PermissionEngine,
    Policy, Principal, Role,
};
use custodia::search_hash::search_digest;
use custodia_derive::Auditable;
use proptest::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

fn file_cipher(key_dir: &std::path::Path) -> FieldCipher {
    custodia_key_file::FileKeyProvider::init(key_dir).expect("Failed to initialize keys");
    let provider =
        custodia_key_file::FileKeyProvider::new(key_dir).expect("Failed to create provider");
    FieldCipher::new(&provider).expect("Failed to create cipher")
}

#[test]
fn test_end_to_end_seal_lookup_display() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cipher = file_cipher(temp_dir.path());

    // Registration: seal the raw identifier once.
    let sealed = seal(&cipher, "Jane.Doe@Example.com ").expect("Sealing failed");

    // Lookup path: exact match via the digest, no decryption involved.
    let lookup_key = search_digest("jane.doe@example.com");
    assert_eq!(lookup_key, sealed.search_key);

    // Display path: decrypt back to the canonical value.
    assert_eq!(display_identifier(&cipher, &sealed), "jane.doe@example.com");
}

#[test]
fn test_display_degrades_to_mask_after_key_change() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let cipher_a = file_cipher(dir_a.path());
    let cipher_b = file_cipher(dir_b.path());

    let sealed = seal(&cipher_a, "jane.doe@example.com").unwrap();

    // Lookup still works: the digest does not depend on the key.
    assert_eq!(sealed.search_key, search_digest("jane.doe@example.com"));

    // Display under the wrong key masks instead of failing.
    let shown = display_identifier(&cipher_b, &sealed);
    assert!(shown.starts_with("***@"));
    assert!(!shown.contains("jane"));
}

#[test]
fn test_nonce_uniqueness_across_encryptions() {
    let temp_dir = TempDir::new().unwrap();
    let cipher = file_cipher(temp_dir.path());

    let blobs: Vec<String> =
        (0..16).map(|_| cipher.encrypt("jane.doe@example.com").unwrap()).collect();

    for (i, a) in blobs.iter().enumerate() {
        for b in &blobs[i + 1..] {
            assert_ne!(a, b, "two encryptions produced the same blob");
        }
        assert_eq!(cipher.decrypt(a).unwrap(), "jane.doe@example.com");
    }
}

fn seed_access_store() -> (InMemoryAccessStore, String) {
    let store = InMemoryAccessStore::new();
    store.insert_role(Role {
        id: 1,
        code: "DIETICIAN".to_string(),
        name: "Dietician".to_string(),
        is_active: true,
    });

    for (id, code) in [(1, ActionCode::ViewPatient), (2, ActionCode::EditPatient)] {
        store.insert_action(ActionRecord {
            id,
            code: code.as_str().to_string(),
            name: code.as_str().to_string(),
            module: code.module().to_string(),
            is_active: true,
        });
        store.grant(1, id);
    }

    let key = search_digest("dietician@example.com");
    store.insert_principal(Principal {
        id: 10,
        search_key: key.clone(),
        role_id: 1,
        is_active: true,
    });

    (store, key)
}

#[test]
fn test_dietician_permission_scenario() {
    let (store, key) = seed_access_store();
    let engine = PermissionEngine::new(store);

    assert!(engine.has_permission(&key, ActionCode::ViewPatient));
    assert!(engine.has_permission(&key, ActionCode::EditPatient));
    assert!(!engine.has_permission(&key, ActionCode::DeletePatient));
}

#[test]
fn test_policy_or_combination() {
    let (store, key) = seed_access_store();
    let engine = PermissionEngine::new(store);

    let view_anyone = Policy::any_of([ActionCode::ViewPatient, ActionCode::ViewDietician]);
    assert!(view_anyone.is_satisfied(&engine, &key));

    let manage = Policy::require(ActionCode::ManageRoles);
    assert!(!manage.is_satisfied(&engine, &key));
}

#[test]
fn test_revocation_takes_effect_immediately() {
    let (store, key) = seed_access_store();
    let engine = PermissionEngine::new(store);

    assert!(engine.has_permission(&key, ActionCode::ViewPatient));
    engine.store().set_action_active(1, false);
    assert!(!engine.has_permission(&key, ActionCode::ViewPatient));
}

#[test]
fn test_registry_validation_reports_missing_codes() {
    let store = InMemoryAccessStore::new();
    // Seed every registered action except two.
    for (id, code) in ActionCode::ALL.iter().enumerate() {
        if matches!(code, ActionCode::ManageRoles | ActionCode::DeletePatient) {
            continue;
        }
        store.insert_action(ActionRecord {
            id: i64::try_from(id).unwrap() + 1,
            code: code.as_str().to_string(),
            name: code.as_str().to_string(),
            module: code.module().to_string(),
            is_active: true,
        });
    }

    let err = validate_action_registry(&store).unwrap_err();
    match err {
        ConfigurationError::MissingActions(missing) => {
            assert!(missing.contains("DELETE_PATIENT"));
            assert!(missing.contains("MANAGE_ROLES"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_registry_validation_passes_when_fully_seeded() {
    let store = InMemoryAccessStore::new();
    for (id, code) in ActionCode::ALL.iter().enumerate() {
        store.insert_action(ActionRecord {
            id: i64::try_from(id).unwrap() + 1,
            code: code.as_str().to_string(),
            name: code.as_str().to_string(),
            module: code.module().to_string(),
            is_active: true,
        });
    }

    assert!(validate_action_registry(&store).is_ok());
}

// A collaborator-side entity using the derive instead of a hand impl.
#[derive(Debug, Clone, Auditable)]
#[audit(table = "user_profiles")]
struct UserProfile {
    #[audit(id)]
    id: Option<i64>,
    display_name: String,
}

#[derive(Debug, thiserror::Error)]
#[error("profile store failure")]
struct ProfileStoreError;

#[derive(Default)]
struct ProfileStore {
    next_id: AtomicI64,
    rows: Mutex<Vec<UserProfile>>,
}

impl EntityStore for ProfileStore {
    type Entity = UserProfile;
    type Error = ProfileStoreError;

    fn insert(&self, entity: &mut UserProfile) -> Result<(), ProfileStoreError> {
        entity.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.rows.lock().unwrap().push(entity.clone());
        Ok(())
    }

    fn update(&self, entity: &UserProfile) -> Result<(), ProfileStoreError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.id == entity.id) {
            *row = entity.clone();
        }
        Ok(())
    }

    fn delete(&self, entity: &UserProfile) -> Result<(), ProfileStoreError> {
        self.rows.lock().unwrap().retain(|row| row.id != entity.id);
        Ok(())
    }
}

#[test]
fn test_derived_auditable_drives_capture() {
    let audited = Audited::new(ProfileStore::default(), AuditRecorder::new(MemoryAuditSink::new()));
    let ctx = AuditContext::principal(
        "jane.doe@example.com",
        Some(RequestOrigin {
            ip_address: "198.51.100.4".to_string(),
            user_agent: Some("test-suite".to_string()),
        }),
    );

    let mut profile = UserProfile { id: None, display_name: "Jane".to_string() };
    audited.insert(&mut profile, &ctx).unwrap();
    profile.display_name = "Jane D.".to_string();
    audited.update(&profile, &ctx).unwrap();
    audited.delete(&profile, &ctx).unwrap();

    let entries = audited.recorder().sink().entries();
    assert_eq!(entries.len(), 3);
    for (record, _) in &entries {
        assert_eq!(record.table_name, "user_profiles");
        assert_eq!(record.record_id, Some(1));
        assert_eq!(record.changed_by, "jane.doe@example.com");
        assert_eq!(record.ip_address, "198.51.100.4");
    }
    assert_eq!(entries[0].0.action, AuditAction::Insert);
    assert_eq!(entries[1].0.action, AuditAction::Update);
    assert_eq!(entries[2].0.action, AuditAction::Delete);
}

#[test]
fn test_unauthenticated_mutation_recorded_as_system() {
    let audited = Audited::new(ProfileStore::default(), AuditRecorder::new(MemoryAuditSink::new()));

    let mut profile = UserProfile { id: None, display_name: "Seeded".to_string() };
    audited.insert(&mut profile, &AuditContext::system()).unwrap();

    assert_eq!(audited.recorder().sink().entries()[0].0.changed_by, "SYSTEM");
}

proptest! {
    #[test]
    fn prop_round_trip_preserves_canonical_form(raw in "\\PC{0,64}") {
        let provider = custodia::key_provider::StaticKeyProvider::from_bytes(vec![42u8; 32]).unwrap();
        let cipher = FieldCipher::new(&provider).unwrap();

        let canonical = normalize(&raw);
        let blob = cipher.encrypt(&canonical).unwrap();
        prop_assert_eq!(cipher.decrypt(&blob).unwrap(), canonical);
    }

    #[test]
    fn prop_digest_insensitive_to_case_and_padding(
        local in "[a-z0-9.]{1,16}",
        domain in "[a-z]{1,10}",
        pad in "[ \\t]{0,4}",
    ) {
        let plain = format!("{local}@{domain}.com");
        let noisy = format!("{pad}{}{pad}", plain.to_uppercase());
        prop_assert_eq!(search_digest(&plain), search_digest(&noisy));
    }

    #[test]
    fn prop_digest_is_fixed_length(raw in "\\PC{0,64}") {
        prop_assert_eq!(search_digest(&raw).len(), custodia::search_hash::SEARCH_DIGEST_LEN);
    }
}
