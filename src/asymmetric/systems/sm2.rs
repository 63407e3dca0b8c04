//! SM2 国密非对称算法门面。
//!
//! - 加密按 GM/T 0003.4 输出 `C1 || C3 || C2`：C1 为 65 字节未压缩点，
//!   C3 = SM3(x2 || M || y2)，C2 = M 异或基于 SM3 的 KDF 输出。
//! - 签名为 64 字节 `r || s`，签名前按用户标识（UID）计算 Z 值，
//!   未设置 UID 时使用配置中的默认值。
//! - 密钥以 PKCS#8 / SPKI PEM 交换。

use crate::asymmetric::traits::AsymmetricEncryptor;
use crate::common::algorithm::Algorithm;
use crate::common::config::CryptoConfig;
use crate::common::encoding::Encoding;
use crate::common::utils::{constant_time_eq, xor_in_place};
use crate::error::{Error, Result};
use aes_gcm::aead::OsRng;
use log::debug;
use signature::{Signer, Verifier};
use sm2::dsa::{Signature, SigningKey, VerifyingKey};
use sm2::elliptic_curve::group::Group;
use sm2::elliptic_curve::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
};
use sm2::elliptic_curve::sec1::ToEncodedPoint;
use sm2::{AffinePoint, NonZeroScalar, ProjectivePoint, PublicKey, SecretKey};
use sm3::{Digest, Sm3};
use std::fmt;
use zeroize::Zeroizing;

/// 未压缩点 C1 的长度
const C1_LEN: usize = 65;
/// SM3 摘要 C3 的长度
const C3_LEN: usize = 32;

/// SM2 链式加密器
#[derive(Clone)]
pub struct Sm2Encryptor {
    public_key: Option<PublicKey>,
    secret_key: Option<SecretKey>,
    uid: Option<String>,
    encoding: Encoding,
    config: CryptoConfig,
}

impl Sm2Encryptor {
    pub fn new() -> Self {
        Self::from_config(CryptoConfig::default())
    }

    pub fn with_config(config: &CryptoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config.clone()))
    }

    fn from_config(config: CryptoConfig) -> Self {
        Self {
            public_key: None,
            secret_key: None,
            uid: None,
            encoding: config.symmetric.encoding,
            config,
        }
    }

    /// 导入 SPKI（`PUBLIC KEY`）PEM 公钥
    pub fn with_public_key(mut self, pem: &str) -> Result<Self> {
        self.set_public_key(pem)?;
        Ok(self)
    }

    pub fn must_with_public_key(self, pem: &str) -> Self {
        match self.with_public_key(pem) {
            Ok(encryptor) => encryptor,
            Err(err) => panic!("invalid SM2 public key: {}", err),
        }
    }

    /// 导入 PKCS#8（`PRIVATE KEY`）PEM 私钥
    pub fn with_private_key(mut self, pem: &str) -> Result<Self> {
        self.set_private_key(pem)?;
        Ok(self)
    }

    pub fn must_with_private_key(self, pem: &str) -> Self {
        match self.with_private_key(pem) {
            Ok(encryptor) => encryptor,
            Err(err) => panic!("invalid SM2 private key: {}", err),
        }
    }

    /// 设置签名使用的用户标识
    ///
    /// 签名算法要求 UID 为合法 UTF-8，否则返回 `InvalidConfiguration`。
    pub fn with_uid(mut self, uid: impl AsRef<[u8]>) -> Result<Self> {
        let uid = std::str::from_utf8(uid.as_ref())
            .map_err(|_| {
                Error::InvalidConfiguration("SM2 user id must be valid UTF-8".to_string())
                    .context("with_uid", Algorithm::Sm2)
            })?
            .to_string();
        self.uid = Some(uid);
        Ok(self)
    }

    pub fn must_with_uid(self, uid: impl AsRef<[u8]>) -> Self {
        match self.with_uid(uid) {
            Ok(encryptor) => encryptor,
            Err(err) => panic!("invalid SM2 user id: {}", err),
        }
    }

    /// 当前生效的用户标识
    pub fn uid(&self) -> &[u8] {
        self.distid().as_bytes()
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn no_encoding(self) -> Self {
        self.with_encoding(Encoding::Raw)
    }

    pub fn base64(self) -> Self {
        self.with_encoding(Encoding::Base64)
    }

    pub fn base64_url(self) -> Self {
        self.with_encoding(Encoding::Base64Url)
    }

    pub fn hex(self) -> Self {
        self.with_encoding(Encoding::Hex)
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    /// 以 SPKI PEM 导出当前公钥
    pub fn public_key_pem(&self) -> Result<String> {
        self.require_public()?
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| Error::Key(format!("failed to export SM2 public key: {}", e)))
    }

    fn require_public(&self) -> Result<&PublicKey> {
        self.public_key.as_ref().ok_or(Error::MissingKey("SM2 public"))
    }

    fn require_secret(&self) -> Result<&SecretKey> {
        self.secret_key
            .as_ref()
            .ok_or(Error::MissingKey("SM2 private"))
    }

    fn distid(&self) -> &str {
        self.uid.as_deref().unwrap_or(&self.config.sm2_uid)
    }

    fn generate_inner(&mut self) -> Result<(String, String)> {
        let secret_key = SecretKey::random(&mut OsRng);
        let public_key = secret_key.public_key();

        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| Error::Key(format!("failed to export SM2 public key: {}", e)))?;
        let private_pem = secret_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| Error::Key(format!("failed to export SM2 private key: {}", e)))?
            .to_string();

        debug!("generated SM2 key pair");
        self.public_key = Some(public_key);
        self.secret_key = Some(secret_key);
        Ok((public_pem, private_pem))
    }

    fn encrypt_inner(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let public_key = self.require_public()?;
        let raw = encrypt_c1c3c2(public_key, plaintext)?;
        Ok(self.encoding.encode(&raw))
    }

    fn decrypt_inner(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let secret_key = self.require_secret()?;
        let raw = self.encoding.decode(ciphertext)?;
        decrypt_c1c3c2(secret_key, &raw)
    }

    fn sign_inner(&self, message: &[u8]) -> Result<Vec<u8>> {
        let secret_key = self.require_secret()?;
        let signing_key = SigningKey::new(self.distid(), secret_key)
            .map_err(|e| Error::Key(format!("invalid SM2 signing key: {}", e)))?;
        let signature: Signature = signing_key
            .try_sign(message)
            .map_err(|e| Error::Signature(format!("SM2 signing failed: {}", e)))?;
        Ok(self.encoding.encode(&signature.to_bytes()))
    }

    fn verify_inner(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        let public_key = self.require_public()?;
        let raw = self.encoding.decode(signature)?;
        let Ok(signature) = Signature::try_from(raw.as_slice()) else {
            return Ok(false);
        };
        let verifying_key = VerifyingKey::new(self.distid(), *public_key)
            .map_err(|e| Error::Key(format!("invalid SM2 verifying key: {}", e)))?;
        Ok(verifying_key.verify(message, &signature).is_ok())
    }
}

impl Default for Sm2Encryptor {
    fn default() -> Self {
        Self::new()
    }
}

/// GM/T 0003.4 密钥派生函数：`KDF(Z, klen) = H(Z || 1) || H(Z || 2) || ...`
fn kdf(z: &[u8], len: usize) -> Zeroizing<Vec<u8>> {
    let mut output = Zeroizing::new(Vec::with_capacity(len + C3_LEN));
    let mut counter: u32 = 1;
    while output.len() < len {
        let mut hasher = Sm3::new();
        hasher.update(z);
        hasher.update(counter.to_be_bytes());
        output.extend_from_slice(&hasher.finalize());
        counter = counter.wrapping_add(1);
    }
    output.truncate(len);
    output
}

/// 返回共享点坐标 `x2 || y2`
fn shared_coordinates(point: AffinePoint) -> Result<Zeroizing<Vec<u8>>> {
    let encoded = point.to_encoded_point(false);
    match (encoded.x(), encoded.y()) {
        (Some(x), Some(y)) => Ok(Zeroizing::new([x.as_slice(), y.as_slice()].concat())),
        _ => Err(Error::Asymmetric("SM2 shared point is the identity".to_string())),
    }
}

fn c3_digest(x2y2: &[u8], message: &[u8]) -> Vec<u8> {
    let (x2, y2) = x2y2.split_at(x2y2.len() / 2);
    let mut hasher = Sm3::new();
    hasher.update(x2);
    hasher.update(message);
    hasher.update(y2);
    hasher.finalize().to_vec()
}

fn encrypt_c1c3c2(public_key: &PublicKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    loop {
        let k = NonZeroScalar::random(&mut OsRng);
        let c1 = (ProjectivePoint::generator() * *k).to_affine();
        let shared = (public_key.to_projective() * *k).to_affine();
        let x2y2 = shared_coordinates(shared)?;

        let mut c2 = plaintext.to_vec();
        if !plaintext.is_empty() {
            let t = kdf(&x2y2, plaintext.len());
            // KDF 输出全零时换一个 k 重新计算
            if t.iter().all(|&b| b == 0) {
                continue;
            }
            xor_in_place(&mut c2, &t);
        }

        let c3 = c3_digest(&x2y2, plaintext);
        let mut output = Vec::with_capacity(C1_LEN + C3_LEN + c2.len());
        output.extend_from_slice(c1.to_encoded_point(false).as_bytes());
        output.extend_from_slice(&c3);
        output.extend_from_slice(&c2);
        return Ok(output);
    }
}

fn decrypt_c1c3c2(secret_key: &SecretKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < C1_LEN + C3_LEN {
        return Err(Error::CiphertextTooShort {
            expected: C1_LEN + C3_LEN,
            actual: ciphertext.len(),
        });
    }
    let (c1, rest) = ciphertext.split_at(C1_LEN);
    let (c3, c2) = rest.split_at(C3_LEN);

    let c1 = PublicKey::from_sec1_bytes(c1)
        .map_err(|_| Error::Asymmetric("SM2 ciphertext has an invalid C1 point".to_string()))?;
    let shared = (c1.to_projective() * *secret_key.to_nonzero_scalar()).to_affine();
    let x2y2 = shared_coordinates(shared)?;

    let mut message = c2.to_vec();
    if !c2.is_empty() {
        let t = kdf(&x2y2, c2.len());
        if t.iter().all(|&b| b == 0) {
            return Err(Error::Asymmetric("SM2 KDF produced an all-zero key".to_string()));
        }
        xor_in_place(&mut message, &t);
    }

    if !constant_time_eq(&c3_digest(&x2y2, &message), c3) {
        return Err(Error::Asymmetric("SM2 C3 digest mismatch".to_string()));
    }
    Ok(message)
}

impl fmt::Debug for Sm2Encryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sm2Encryptor")
            .field("has_public_key", &self.public_key.is_some())
            .field("has_secret_key", &self.secret_key.is_some())
            .field("uid", &self.distid())
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl AsymmetricEncryptor for Sm2Encryptor {
    const ALGORITHM: Algorithm = Algorithm::Sm2;

    fn generate_key_pair(&mut self) -> Result<(String, String)> {
        self.generate_inner()
            .map_err(|e| e.context("generate_key_pair", Self::ALGORITHM))
    }

    fn set_public_key(&mut self, pem: &str) -> Result<()> {
        let public_key = PublicKey::from_public_key_pem(pem).map_err(|e| {
            Error::Key(format!("failed to parse SM2 public key: {}", e))
                .context("with_public_key", Self::ALGORITHM)
        })?;
        self.public_key = Some(public_key);
        Ok(())
    }

    fn set_private_key(&mut self, pem: &str) -> Result<()> {
        let secret_key = SecretKey::from_pkcs8_pem(pem).map_err(|e| {
            Error::Key(format!("failed to parse SM2 private key: {}", e))
                .context("with_private_key", Self::ALGORITHM)
        })?;
        self.public_key = Some(secret_key.public_key());
        self.secret_key = Some(secret_key);
        Ok(())
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_inner(plaintext)
            .map_err(|e| e.context("encrypt", Self::ALGORITHM))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_inner(ciphertext)
            .map_err(|e| e.context("decrypt", Self::ALGORITHM))
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.sign_inner(message)
            .map_err(|e| e.context("sign", Self::ALGORITHM))
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        self.verify_inner(message, signature)
            .map_err(|e| e.context("verify", Self::ALGORITHM))
    }

    /// 清除自定义 UID 并恢复默认编码，密钥保持不变
    fn reset(&mut self) {
        self.uid = None;
        self.encoding = self.config.symmetric.encoding;
        debug!("SM2 encryptor reset");
    }
}
