//!
//! IV 生命周期与密文格式的集成测试
//!

use seal_cipher::{
    AesEncryptor, DesEncryptor, Encoding, Error, IvState, Sm4Encryptor, TripleDesEncryptor,
};

const KEY: &[u8; 16] = b"0123456789abcdef";
const IV: &[u8; 16] = b"abcdefghijklmnop";

#[test]
fn test_supplied_iv_end_to_end() {
    let mut encryptor = AesEncryptor::new(KEY)
        .unwrap()
        .with_iv(IV)
        .unwrap()
        .cbc()
        .pkcs7()
        .base64();

    let first = encryptor.encrypt_to_string(b"123456").unwrap();
    let second = encryptor.encrypt_to_string(b"123456").unwrap();
    assert_eq!(first, "kBeDY+CEdHv73eBspJFNBg==");
    assert_eq!(first, second);
    assert_eq!(encryptor.decrypt(first.as_bytes()).unwrap(), b"123456");
}

#[test]
fn test_stream_mode_known_answers() {
    let plaintext = b"hello, seal-cipher!";
    let cases = [
        ("cfb", "ed07119c2a3257338e476730929d8c0c470496"),
        ("ofb", "ed07119c2a3257338e476730929d8c0c9caa6a"),
        ("ctr", "ed07119c2a3257338e476730929d8c0cb6b964"),
    ];
    for (mode, expected) in cases {
        let mut encryptor = AesEncryptor::new(KEY)
            .unwrap()
            .with_iv(IV)
            .unwrap()
            .with_mode(mode.parse().unwrap())
            .hex();
        let ciphertext = encryptor.encrypt(plaintext).unwrap();
        assert_eq!(String::from_utf8(ciphertext.clone()).unwrap(), expected, "{}", mode);
        assert_eq!(encryptor.decrypt(&ciphertext).unwrap(), plaintext);
    }
}

#[test]
fn test_des_family_cbc_known_answers() {
    let mut triple = TripleDesEncryptor::new(b"0123456789abcdefghijklmn")
        .unwrap()
        .with_iv(b"12345678")
        .unwrap()
        .hex();
    assert_eq!(
        triple.encrypt(b"three times").unwrap(),
        b"5cd698feceeb0064ccfd03779dc2de3b"
    );

    let mut single = DesEncryptor::new(b"8bytekey")
        .unwrap()
        .with_iv(b"12345678")
        .unwrap()
        .hex();
    assert_eq!(
        single.encrypt(b"three times").unwrap(),
        b"a95d3adcdc55e89d99c94560c7ba59b5"
    );
}

#[test]
fn test_supplied_iv_required_for_decrypt() {
    let mut sender = Sm4Encryptor::new(KEY).unwrap().with_iv(IV).unwrap().no_encoding();
    let ciphertext = sender.encrypt(b"sixteen byte msg").unwrap();
    assert_eq!(ciphertext.len(), 32);

    // 不知道 IV 的接收方会把第一个块当成 IV，结果不可能是原文
    let receiver = Sm4Encryptor::new(KEY).unwrap().no_encoding();
    match receiver.decrypt(&ciphertext) {
        Ok(plaintext) => assert_ne!(plaintext, b"sixteen byte msg"),
        Err(err) => assert!(matches!(err.root_cause(), Error::InvalidPadding)),
    }

    let receiver = receiver.with_iv(IV).unwrap();
    assert_eq!(receiver.decrypt(&ciphertext).unwrap(), b"sixteen byte msg");
}

#[test]
fn test_generated_iv_lifecycle() {
    let mut encryptor = AesEncryptor::new(KEY).unwrap().ofb().no_encoding();
    assert_eq!(encryptor.iv_state(), IvState::Unset);
    assert!(encryptor.iv().is_none());

    let first = encryptor.encrypt(b"reuse me").unwrap();
    assert_eq!(encryptor.iv_state(), IvState::Generated);
    assert!(encryptor.iv_embedded());
    let iv = encryptor.iv().unwrap();
    assert_eq!(&first[..16], iv.as_slice());
    assert_eq!(first.len(), 16 + 8);

    // 同一实例复用生成的 IV
    let second = encryptor.encrypt(b"reuse me").unwrap();
    assert_eq!(first, second);

    // 清除后重新生成
    encryptor.clear_iv();
    let third = encryptor.encrypt(b"reuse me").unwrap();
    assert_ne!(&third[..16], iv.as_slice());
    assert_eq!(encryptor.decrypt(&third).unwrap(), b"reuse me");
    assert_eq!(encryptor.decrypt(&first).unwrap(), b"reuse me");
}

#[test]
fn test_switching_to_supplied_iv_drops_prefix() {
    let mut encryptor = AesEncryptor::new(KEY).unwrap().no_encoding();
    let embedded = encryptor.encrypt(b"x").unwrap();
    assert_eq!(embedded.len(), 32);

    let mut encryptor = encryptor.with_iv(IV).unwrap();
    assert_eq!(encryptor.iv_state(), IvState::Supplied);
    let bare = encryptor.encrypt(b"x").unwrap();
    assert_eq!(bare.len(), 16);
}

#[test]
fn test_embedded_ciphertext_too_short() {
    let encryptor = AesEncryptor::new(KEY).unwrap().ctr().no_encoding();
    let err = encryptor.decrypt(&[0u8; 10]).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        Error::CiphertextTooShort {
            expected: 16,
            actual: 10
        }
    ));
}

#[test]
fn test_ecb_ignores_iv() {
    let mut with_iv = AesEncryptor::new(KEY).unwrap().with_iv(IV).unwrap().ecb().hex();
    let mut without = AesEncryptor::new(KEY).unwrap().ecb().hex();
    assert_eq!(
        with_iv.encrypt(b"same input").unwrap(),
        without.encrypt(b"same input").unwrap()
    );
    assert_eq!(without.iv_state(), IvState::Unset);
}

#[test]
fn test_reset_returns_to_defaults() {
    let mut encryptor = AesEncryptor::new(KEY)
        .unwrap()
        .with_iv(IV)
        .unwrap()
        .ctr()
        .with_encoding(Encoding::Hex);
    encryptor.encrypt(b"abc").unwrap();
    encryptor.reset();

    assert_eq!(encryptor.iv_state(), IvState::Unset);
    assert_eq!(encryptor.encoding(), Encoding::Base64);
    let ciphertext = encryptor.encrypt(b"abc").unwrap();
    assert_eq!(encryptor.iv_state(), IvState::Generated);
    assert_eq!(encryptor.decrypt(&ciphertext).unwrap(), b"abc");
}

#[test]
fn test_separate_instances_generate_distinct_ivs() {
    let mut first = AesEncryptor::new(KEY).unwrap().cbc().pkcs7().no_encoding();
    let mut second = AesEncryptor::new(KEY).unwrap().cbc().pkcs7().no_encoding();

    let a = first.encrypt(b"same plaintext").unwrap();
    let b = second.encrypt(b"same plaintext").unwrap();
    assert_ne!(a, b);
    assert_ne!(first.iv(), second.iv());

    // 同一实例复用首次生成的 IV
    assert_eq!(first.encrypt(b"same plaintext").unwrap(), a);
    assert_eq!(second.encrypt(b"same plaintext").unwrap(), b);

    // IV 随密文携带，任一实例都能解开对方的密文
    assert_eq!(first.decrypt(&b).unwrap(), b"same plaintext");
    assert_eq!(second.decrypt(&a).unwrap(), b"same plaintext");
}
