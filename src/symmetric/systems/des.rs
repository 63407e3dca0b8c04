//! DES 对称加密系统
//!
//! 仅为兼容旧系统保留，新设计应使用 AES 或 SM4。
use crate::common::algorithm::Algorithm;
use crate::symmetric::encryptor::SymmetricEncryptor;
use crate::symmetric::traits::SymmetricCryptographicSystem;

#[derive(Debug, Clone, Copy)]
pub struct DesSystem;

impl SymmetricCryptographicSystem for DesSystem {
    const ALGORITHM: Algorithm = Algorithm::Des;
    const BLOCK_SIZE: usize = 8;
    const KEY_SIZES: &'static [usize] = &[8];
}

/// DES 链式加密器
pub type DesEncryptor = SymmetricEncryptor<DesSystem>;
