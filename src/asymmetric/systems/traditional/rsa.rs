//! `RsaEncryptor` 提供基于 RSA PKCS#1 v1.5 的加解密，以及 PKCS#1 v1.5 + SHA-256 签名。
//!
//! 生成的密钥对使用 PKCS#1 PEM；导入时同时接受 PKCS#1 与 PKCS#8 / SPKI PEM。

use crate::asymmetric::traits::AsymmetricEncryptor;
use crate::common::algorithm::Algorithm;
use crate::common::config::{CryptoConfig, validate_rsa_key_bits};
use crate::common::encoding::Encoding;
use crate::error::{Error, Result};
use log::debug;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, LineEnding};
use rsa::rand_core::OsRng as RsaOsRng;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::fmt;

/// RSA 链式加密器
#[derive(Clone)]
pub struct RsaEncryptor {
    public_key: Option<RsaPublicKey>,
    private_key: Option<RsaPrivateKey>,
    key_bits: usize,
    encoding: Encoding,
    config: CryptoConfig,
}

impl RsaEncryptor {
    /// 使用默认配置（2048 位，Base64 编码）创建，尚未持有任何密钥
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
            private_key: None,
            key_bits: config.rsa_key_bits,
            encoding: config.symmetric.encoding,
            config,
        }
    }

    /// 设置之后 `generate_key_pair` 使用的密钥位数
    pub fn with_key_size(mut self, bits: usize) -> Result<Self> {
        validate_rsa_key_bits(bits).map_err(|e| e.context("with_key_size", Algorithm::Rsa))?;
        self.key_bits = bits;
        Ok(self)
    }

    pub fn must_with_key_size(self, bits: usize) -> Self {
        match self.with_key_size(bits) {
            Ok(encryptor) => encryptor,
            Err(err) => panic!("invalid RSA key size: {}", err),
        }
    }

    /// 导入 PKCS#1（`RSA PUBLIC KEY`）或 SPKI（`PUBLIC KEY`）格式的公钥
    pub fn with_public_key(mut self, pem: &str) -> Result<Self> {
        self.set_public_key(pem)?;
        Ok(self)
    }

    pub fn must_with_public_key(self, pem: &str) -> Self {
        match self.with_public_key(pem) {
            Ok(encryptor) => encryptor,
            Err(err) => panic!("invalid RSA public key: {}", err),
        }
    }

    /// 导入 PKCS#1（`RSA PRIVATE KEY`）或 PKCS#8（`PRIVATE KEY`）格式的私钥
    pub fn with_private_key(mut self, pem: &str) -> Result<Self> {
        self.set_private_key(pem)?;
        Ok(self)
    }

    pub fn must_with_private_key(self, pem: &str) -> Self {
        match self.with_private_key(pem) {
            Ok(encryptor) => encryptor,
            Err(err) => panic!("invalid RSA private key: {}", err),
        }
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

    pub fn key_size(&self) -> usize {
        self.key_bits
    }

    pub fn public_key(&self) -> Option<&RsaPublicKey> {
        self.public_key.as_ref()
    }

    /// 以 PKCS#1 PEM 导出当前公钥
    pub fn public_key_pem(&self) -> Result<String> {
        let public_key = self.require_public()?;
        public_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| Error::Key(format!("failed to export RSA public key: {}", e)))
    }

    fn require_public(&self) -> Result<&RsaPublicKey> {
        self.public_key.as_ref().ok_or(Error::MissingKey("RSA public"))
    }

    fn require_private(&self) -> Result<&RsaPrivateKey> {
        self.private_key
            .as_ref()
            .ok_or(Error::MissingKey("RSA private"))
    }

    fn generate_inner(&mut self) -> Result<(String, String)> {
        let mut rng = RsaOsRng;
        let private_key = RsaPrivateKey::new(&mut rng, self.key_bits)
            .map_err(|e| Error::Key(format!("failed to generate RSA key: {}", e)))?;
        let public_key = RsaPublicKey::from(&private_key);

        let public_pem = public_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| Error::Key(format!("failed to export RSA public key: {}", e)))?;
        let private_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| Error::Key(format!("failed to export RSA private key: {}", e)))?
            .to_string();

        debug!("generated {}-bit RSA key pair", self.key_bits);
        self.public_key = Some(public_key);
        self.private_key = Some(private_key);
        Ok((public_pem, private_pem))
    }

    fn encrypt_inner(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let public_key = self.require_public()?;
        let mut rng = RsaOsRng;
        let ciphertext = public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, plaintext)
            .map_err(|e| Error::Asymmetric(format!("RSA encryption failed: {}", e)))?;
        Ok(self.encoding.encode(&ciphertext))
    }

    fn decrypt_inner(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let private_key = self.require_private()?;
        let raw = self.encoding.decode(ciphertext)?;
        private_key
            .decrypt(Pkcs1v15Encrypt, &raw)
            .map_err(|_| Error::Asymmetric("RSA decryption failed".to_string()))
    }

    fn sign_inner(&self, message: &[u8]) -> Result<Vec<u8>> {
        let private_key = self.require_private()?;
        let signing_key = SigningKey::<Sha256>::new(private_key.clone());
        let signature = signing_key
            .try_sign(message)
            .map_err(|e| Error::Signature(format!("RSA signing failed: {}", e)))?;
        Ok(self.encoding.encode(&signature.to_vec()))
    }

    fn verify_inner(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        let public_key = self.require_public()?;
        let raw = self.encoding.decode(signature)?;
        let Ok(signature) = Signature::try_from(raw.as_slice()) else {
            return Ok(false);
        };
        let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
        Ok(verifying_key.verify(message, &signature).is_ok())
    }
}

impl Default for RsaEncryptor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_public_key(pem: &str) -> Result<RsaPublicKey> {
    RsaPublicKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPublicKey::from_public_key_pem(pem))
        .map_err(|e| Error::Key(format!("failed to parse RSA public key: {}", e)))
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|e| Error::Key(format!("failed to parse RSA private key: {}", e)))
}

impl fmt::Debug for RsaEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaEncryptor")
            .field("key_bits", &self.key_bits)
            .field("has_public_key", &self.public_key.is_some())
            .field("has_private_key", &self.private_key.is_some())
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl AsymmetricEncryptor for RsaEncryptor {
    const ALGORITHM: Algorithm = Algorithm::Rsa;

    fn generate_key_pair(&mut self) -> Result<(String, String)> {
        self.generate_inner()
            .map_err(|e| e.context("generate_key_pair", Self::ALGORITHM))
    }

    fn set_public_key(&mut self, pem: &str) -> Result<()> {
        let public_key =
            parse_public_key(pem).map_err(|e| e.context("with_public_key", Self::ALGORITHM))?;
        self.public_key = Some(public_key);
        Ok(())
    }

    fn set_private_key(&mut self, pem: &str) -> Result<()> {
        let private_key =
            parse_private_key(pem).map_err(|e| e.context("with_private_key", Self::ALGORITHM))?;
        self.public_key = Some(RsaPublicKey::from(&private_key));
        self.private_key = Some(private_key);
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

    fn reset(&mut self) {
        self.encoding = self.config.symmetric.encoding;
        self.key_bits = self.config.rsa_key_bits;
        debug!("RSA encryptor reset");
    }
}
