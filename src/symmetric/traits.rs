use crate::common::algorithm::Algorithm;
use crate::error::{Error, Result};
use crate::symmetric::primitive::BlockCipherKind;

/// 对称分组密码系统的公共特征
///
/// 每个实现都是一个零大小的标记类型，只描述算法的静态属性，
/// 密钥与 IV 由 [`SymmetricEncryptor`](crate::symmetric::encryptor::SymmetricEncryptor) 持有。
pub trait SymmetricCryptographicSystem: Send + Sync + 'static {
    /// 算法标识
    const ALGORITHM: Algorithm;

    /// 块大小（字节）
    const BLOCK_SIZE: usize;

    /// 允许的密钥长度（字节）
    const KEY_SIZES: &'static [usize];

    /// 校验密钥长度
    fn validate_key(key: &[u8]) -> Result<()> {
        if !Self::KEY_SIZES.contains(&key.len()) {
            return Err(Error::InvalidKeyLength {
                algorithm: Self::ALGORITHM,
                expected: Self::KEY_SIZES,
                actual: key.len(),
            });
        }
        Ok(())
    }

    /// 用密钥初始化分组密码
    fn new_cipher(key: &[u8]) -> Result<BlockCipherKind> {
        Self::validate_key(key)?;
        BlockCipherKind::new(Self::ALGORITHM, key)
    }
}
