// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn round_trips_for_any_plaintext() {
    for plaintext in ["SECRET", "a", "a much longer value with spaces 123!@#"] {
        let key = "PjhSLgp2FbZqbdMzwLEPK-VRaIBiiN_WwEwnAnqhA_o=";
        let encrypted = encrypt(key, plaintext).expect("encrypt should succeed");
        assert_ne!(encrypted, plaintext, "ciphertext must not equal plaintext");
        let decrypted = decrypt(key, &encrypted).expect("decrypt should succeed");
        assert_eq!(decrypted, plaintext);
    }
}

#[test]
fn two_encryptions_of_the_same_value_differ() {
    let key = "master-secret";
    let a = encrypt(key, "SECRET").expect("encrypt should succeed");
    let b = encrypt(key, "SECRET").expect("encrypt should succeed");
    assert_ne!(a, b, "random salt/nonce must make ciphertexts non-deterministic");
}

#[test]
fn empty_plaintext_is_rejected() {
    let err = encrypt("key", "").expect_err("empty plaintext must be rejected");
    assert_eq!(err, CryptoError::EmptyPlaintext);
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let encrypted = encrypt("right-key", "SECRET").expect("encrypt should succeed");
    let err = decrypt("wrong-key", &encrypted).expect_err("wrong key must fail");
    assert_eq!(err, CryptoError::Decrypt);
}

#[test]
fn rekey_value_re_encrypts_under_new_secret() {
    let encrypted = encrypt("old-key", "SECRET").expect("encrypt should succeed");
    let rekeyed = rekey_value("old-key", "new-key", &encrypted).expect("rekey should succeed");
    assert_eq!(decrypt("new-key", &rekeyed).expect("decrypt should succeed"), "SECRET");
    assert!(decrypt("old-key", &rekeyed).is_err());
}

#[test]
fn malformed_blob_is_rejected() {
    let err = decrypt("key", "not-valid-base64!!").expect_err("malformed blob must fail");
    assert_eq!(err, CryptoError::Malformed);
}
