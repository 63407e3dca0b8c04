//! AES 对称加密系统（AES-128 / AES-192 / AES-256，按密钥长度自动选择）
use crate::common::algorithm::Algorithm;
use crate::symmetric::encryptor::SymmetricEncryptor;
use crate::symmetric::traits::SymmetricCryptographicSystem;

/// AES 对称加密系统
#[derive(Debug, Clone, Copy)]
pub struct AesSystem;

impl SymmetricCryptographicSystem for AesSystem {
    const ALGORITHM: Algorithm = Algorithm::Aes;
    const BLOCK_SIZE: usize = 16;
    const KEY_SIZES: &'static [usize] = &[16, 24, 32];
}

/// AES 链式加密器
pub type AesEncryptor = SymmetricEncryptor<AesSystem>;
