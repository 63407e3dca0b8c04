//! 3DES（EDE3，24 字节密钥）对称加密系统
use crate::common::algorithm::Algorithm;
use crate::symmetric::encryptor::SymmetricEncryptor;
use crate::symmetric::traits::SymmetricCryptographicSystem;

#[derive(Debug, Clone, Copy)]
pub struct TripleDesSystem;

impl SymmetricCryptographicSystem for TripleDesSystem {
    const ALGORITHM: Algorithm = Algorithm::TripleDes;
    const BLOCK_SIZE: usize = 8;
    const KEY_SIZES: &'static [usize] = &[24];
}

/// 3DES 链式加密器
pub type TripleDesEncryptor = SymmetricEncryptor<TripleDesSystem>;
