//!
//! GCM 完整性测试：篡改密文的任意一个字节都必须导致认证失败
//!

use seal_cipher::{AesEncryptor, Error, IvState, Sm4Encryptor};

fn assert_auth_failure(result: seal_cipher::Result<Vec<u8>>, position: usize) {
    let err = result.expect_err("tampered ciphertext must not decrypt");
    assert!(
        matches!(err.root_cause(), Error::AuthenticationFailure),
        "byte {}: unexpected error {}",
        position,
        err
    );
}

#[test]
fn test_aes_gcm_detects_every_flipped_byte() {
    let mut encryptor = AesEncryptor::new([9u8; 32]).unwrap().gcm().no_encoding();
    let ciphertext = encryptor.encrypt(b"integrity matters").unwrap();
    assert_eq!(ciphertext.len(), 12 + 17 + 16);

    for position in 0..ciphertext.len() {
        let mut tampered = ciphertext.clone();
        tampered[position] ^= 0x01;
        assert_auth_failure(encryptor.decrypt(&tampered), position);
    }
    assert_eq!(encryptor.decrypt(&ciphertext).unwrap(), b"integrity matters");
}

#[test]
fn test_sm4_gcm_detects_every_flipped_byte() {
    let mut encryptor = Sm4Encryptor::new([4u8; 16]).unwrap().gcm().no_encoding();
    let ciphertext = encryptor.encrypt(b"sm4").unwrap();
    for position in 0..ciphertext.len() {
        let mut tampered = ciphertext.clone();
        tampered[position] ^= 0x80;
        assert_auth_failure(encryptor.decrypt(&tampered), position);
    }
}

#[test]
fn test_gcm_truncated_input() {
    let mut encryptor = AesEncryptor::new([9u8; 16]).unwrap().gcm().no_encoding();
    let ciphertext = encryptor.encrypt(b"").unwrap();
    assert_eq!(ciphertext.len(), 28);
    assert_eq!(encryptor.decrypt(&ciphertext).unwrap(), b"");

    assert_auth_failure(encryptor.decrypt(&ciphertext[..27]), 27);
    assert_auth_failure(encryptor.decrypt(&[]), 0);
}

#[test]
fn test_gcm_wrong_key() {
    let mut alice = AesEncryptor::new([1u8; 16]).unwrap().gcm();
    let bob = AesEncryptor::new([2u8; 16]).unwrap().gcm();
    let ciphertext = alice.encrypt(b"for alice only").unwrap();
    assert_auth_failure(bob.decrypt(&ciphertext), 0);
}

#[test]
fn test_gcm_ignores_supplied_iv() {
    let mut encryptor = AesEncryptor::new([3u8; 16])
        .unwrap()
        .with_iv([0u8; 16])
        .unwrap()
        .gcm()
        .no_encoding();
    let a = encryptor.encrypt(b"nonce").unwrap();
    let b = encryptor.encrypt(b"nonce").unwrap();
    assert_ne!(a[..12], b[..12]);
    assert_eq!(encryptor.iv_state(), IvState::Supplied);
    assert_eq!(encryptor.decrypt(&b).unwrap(), b"nonce");
}
