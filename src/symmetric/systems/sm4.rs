//! SM4 对称加密系统（GB/T 32907）
use crate::common::algorithm::Algorithm;
use crate::symmetric::encryptor::SymmetricEncryptor;
use crate::symmetric::traits::SymmetricCryptographicSystem;

/// SM4 对称加密系统
#[derive(Debug, Clone, Copy)]
pub struct Sm4System;

impl SymmetricCryptographicSystem for Sm4System {
    const ALGORITHM: Algorithm = Algorithm::Sm4;
    const BLOCK_SIZE: usize = 16;
    const KEY_SIZES: &'static [usize] = &[16];
}

/// SM4 链式加密器
pub type Sm4Encryptor = SymmetricEncryptor<Sm4System>;
