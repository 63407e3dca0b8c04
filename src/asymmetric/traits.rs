//! 定义了非对称加密器门面的公共 Trait。
use crate::common::algorithm::Algorithm;
use crate::common::encoding::Encoding;
use crate::error::Result;

/// `AsymmetricEncryptor` 描述 RSA、SM2 等非对称门面共享的调用面。
///
/// 密钥以 PEM 文本交换；密文与签名按当前 [`Encoding`] 输出，
/// 解密与验签时按同一编码解析输入。
pub trait AsymmetricEncryptor: Sized {
    /// 算法标识
    const ALGORITHM: Algorithm;

    /// 生成新的密钥对并保存在门面上，返回 `(公钥 PEM, 私钥 PEM)`
    fn generate_key_pair(&mut self) -> Result<(String, String)>;

    /// 导入公钥
    fn set_public_key(&mut self, pem: &str) -> Result<()>;

    /// 导入私钥，同时导出对应的公钥
    fn set_private_key(&mut self, pem: &str) -> Result<()>;

    /// 当前输出编码
    fn encoding(&self) -> Encoding;

    fn set_encoding(&mut self, encoding: Encoding);

    /// 使用公钥加密
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// 使用私钥解密
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// 使用私钥签名
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// 使用公钥验签。签名不匹配时返回 `Ok(false)`，输入无法解码时返回错误。
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool>;

    /// 恢复默认编码与默认参数，已导入的密钥保持不变
    fn reset(&mut self);
}
