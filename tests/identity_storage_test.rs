//! Integration tests for identity key storage
//!
//! Password-based encryption of secret keys and the on-disk identity layout.

use privacy_shield_claims::ledger::Signer;
use privacy_shield_claims::storage::file_system::{
    identity_dir, list_identities, load_identity, load_identity_metadata, save_identity,
    FileSystemError,
};
use privacy_shield_claims::storage::keys::{
    decrypt_data, decrypt_secret_key, encrypt_data, encrypt_secret_key, KeyError,
};
use privacy_shield_claims::storage::models::IdentityMetadata;

#[test]
fn test_secret_key_encryption_round_trips_and_is_salted() {
    let signer = Signer::generate();

    let sealed1 = encrypt_secret_key(signer.secret_key(), "correct horse").unwrap();
    let sealed2 = encrypt_secret_key(signer.secret_key(), "correct horse").unwrap();
    assert_ne!(sealed1, sealed2, "Fresh salt and nonce on every encryption");

    let recovered = decrypt_secret_key(&sealed1, "correct horse").unwrap();
    assert_eq!(recovered, *signer.secret_key());
}

#[test]
fn test_wrong_password_is_rejected() {
    let sealed = encrypt_data(b"secret", "password1").unwrap();

    let result = decrypt_data(&sealed, "password2");
    assert!(matches!(result, Err(KeyError::Decryption(_))));
}

#[test]
fn test_truncated_or_malformed_blobs_are_rejected() {
    assert!(matches!(
        decrypt_data("00ff", "pw"),
        Err(KeyError::Decryption(_))
    ));
    assert!(matches!(
        decrypt_data("not hex", "pw"),
        Err(KeyError::Decryption(_))
    ));
}

#[test]
fn test_identity_save_and_load() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path();

    let signer = Signer::generate();
    let metadata = IdentityMetadata::new("alice".to_string(), signer.address());
    save_identity(data_dir, &metadata, &signer, "pw-alice").unwrap();

    let dir = identity_dir(data_dir, "alice").unwrap();
    assert!(dir.join("identity.json").exists());
    assert!(dir.join("keys.json").exists());

    let keys_json = std::fs::read_to_string(dir.join("keys.json")).unwrap();
    assert!(
        !keys_json.contains(&hex::encode(signer.secret_key().secret_bytes())),
        "Secret key must not be stored in plain text"
    );

    let (loaded, loaded_metadata) = load_identity(data_dir, "alice", "pw-alice").unwrap();
    assert_eq!(loaded.address(), signer.address());
    assert_eq!(loaded_metadata.name, "alice");
    assert_eq!(loaded_metadata.address, signer.address());

    let result = load_identity(data_dir, "alice", "wrong");
    assert!(matches!(result, Err(FileSystemError::Key(_))));
}

#[test]
fn test_identity_names_are_unique() {
    let temp_dir = tempfile::tempdir().unwrap();
    let signer = Signer::generate();
    let metadata = IdentityMetadata::new("bob".to_string(), signer.address());

    save_identity(temp_dir.path(), &metadata, &signer, "pw").unwrap();
    let result = save_identity(temp_dir.path(), &metadata, &signer, "pw");
    assert!(matches!(result, Err(FileSystemError::IdentityExists(name)) if name == "bob"));
}

#[test]
fn test_list_identities_is_sorted_and_skips_strays() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path();

    assert!(list_identities(data_dir).unwrap().is_empty());

    for name in ["carol", "alice", "bob"] {
        let signer = Signer::generate();
        let metadata = IdentityMetadata::new(name.to_string(), signer.address());
        save_identity(data_dir, &metadata, &signer, "pw").unwrap();
    }
    std::fs::create_dir_all(data_dir.join("identities").join("broken")).unwrap();

    let names: Vec<String> = list_identities(data_dir)
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);
}

#[test]
fn test_missing_identity_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();

    let result = load_identity_metadata(temp_dir.path(), "nobody");
    assert!(matches!(result, Err(FileSystemError::IdentityNotFound(_))));

    let result = load_identity_metadata(temp_dir.path(), "../escape");
    assert!(matches!(result, Err(FileSystemError::InvalidName(_))));
}
