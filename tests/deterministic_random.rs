//!
//! 注入确定性随机源后，自动生成的 IV 与 GCM nonce 可以精确预期。
//!
//! 随机源是进程级的替换点，所以这些用例放在独立的测试二进制中，并串行执行。

use rand_core::RngCore;
use seal_cipher::common::random::{random_bytes, set_random_source};
use seal_cipher::AesEncryptor;
use std::sync::Mutex;

static SERIAL: Mutex<()> = Mutex::new(());

/// 每个字节都是同一个值的随机源
struct ConstantRng(u8);

impl RngCore for ConstantRng {
    fn next_u32(&mut self) -> u32 {
        u32::from_ne_bytes([self.0; 4])
    }

    fn next_u64(&mut self) -> u64 {
        u64::from_ne_bytes([self.0; 8])
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(self.0);
    }
}

struct RestoreOs;

impl Drop for RestoreOs {
    fn drop(&mut self) {
        set_random_source(None);
    }
}

const KEY: &[u8; 16] = b"0123456789abcdef";

#[test]
fn test_generated_iv_comes_from_injected_source() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    set_random_source(Some(Box::new(ConstantRng(0x42))));
    let _restore = RestoreOs;

    let mut encryptor = AesEncryptor::new(KEY).unwrap().hex();
    let ciphertext = encryptor.encrypt(b"deterministic").unwrap();
    assert_eq!(
        ciphertext,
        b"42424242424242424242424242424242e822c7dc13a4737e38d071fac8d27a2f"
    );
    assert_eq!(encryptor.iv().unwrap(), vec![0x42; 16]);
}

#[test]
fn test_gcm_nonce_comes_from_injected_source() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    set_random_source(Some(Box::new(ConstantRng(0x42))));
    let _restore = RestoreOs;

    let mut encryptor = AesEncryptor::new(KEY).unwrap().gcm().hex();
    let expected: &[u8] =
        b"424242424242424242424242d596e45b8d8be56e8b2db1e3564e010b3839e99f2419543c7574d68255";
    assert_eq!(encryptor.encrypt(b"deterministic").unwrap(), expected);
    // 随机源相同，nonce 也相同
    assert_eq!(encryptor.encrypt(b"deterministic").unwrap(), expected);
    assert_eq!(encryptor.decrypt(expected).unwrap(), b"deterministic");
}

#[test]
fn test_restoring_os_source() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    set_random_source(Some(Box::new(ConstantRng(0))));
    assert_eq!(random_bytes(8).unwrap(), vec![0u8; 8]);

    set_random_source(None);
    let a = random_bytes(32).unwrap();
    let b = random_bytes(32).unwrap();
    assert_ne!(a, b);
}
