//! 对称加密器门面。
//!
//! `SymmetricEncryptor` 持有密钥、可选 IV 以及模式 / 填充 / 编码配置，
//! 提供链式配置接口与 `encrypt` / `decrypt`。
//!
//! IV 生命周期：
//! - 未设置 IV 时，需要 IV 的模式会在第一次加密时随机生成一个，并作为前缀嵌入密文；
//!   之后同一实例上的每次加密都复用这个 IV。
//! - 通过 [`SymmetricEncryptor::with_iv`] 提供的 IV 不会写入密文，
//!   解密方需要提供相同的 IV。
//!
//! 同一个实例在多次加密之间复用 IV，这会在同一密钥下泄露消息之间的关系。
//! 需要每条消息独立 IV 时，为每条消息新建实例、调用 [`SymmetricEncryptor::clear_iv`]，
//! 或直接使用 GCM 模式（GCM 每次加密都会生成新的 nonce）。
use crate::common::algorithm::Algorithm;
use crate::common::config::{CryptoConfig, SymmetricDefaults};
use crate::common::encoding::Encoding;
use crate::common::random::random_bytes;
use crate::common::utils::SecureBytes;
use crate::error::{Error, Result};
use crate::symmetric::modes::{IvPolicy, IvState, Mode, ModeEngine};
use crate::symmetric::padding::Padding;
use crate::symmetric::primitive::BlockCipherKind;
use crate::symmetric::traits::SymmetricCryptographicSystem;
use log::{debug, warn};
use std::fmt;
use std::marker::PhantomData;
use zeroize::{Zeroize, Zeroizing};

/// 链式对称加密器
pub struct SymmetricEncryptor<S: SymmetricCryptographicSystem> {
    key: SecureBytes,
    cipher: BlockCipherKind,
    iv: Option<SecureBytes>,
    iv_state: IvState,
    mode: Mode,
    padding: Padding,
    encoding: Encoding,
    defaults: SymmetricDefaults,
    _system: PhantomData<S>,
}

impl<S: SymmetricCryptographicSystem> SymmetricEncryptor<S> {
    /// 使用默认配置（CBC / PKCS7 / Base64）创建加密器
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self> {
        Self::with_defaults(key, SymmetricDefaults::default())
    }

    /// 与 [`new`](Self::new) 相同，但密钥非法时直接 panic
    pub fn must_new(key: impl AsRef<[u8]>) -> Self {
        match Self::new(key) {
            Ok(encryptor) => encryptor,
            Err(err) => panic!("failed to create {} encryptor: {}", S::ALGORITHM, err),
        }
    }

    /// 使用配置中的对称默认值创建加密器
    pub fn with_config(key: impl AsRef<[u8]>, config: &CryptoConfig) -> Result<Self> {
        Self::with_defaults(key, config.symmetric)
    }

    /// 使用指定的默认值创建加密器，`reset()` 会恢复到这些默认值
    pub fn with_defaults(key: impl AsRef<[u8]>, defaults: SymmetricDefaults) -> Result<Self> {
        let key = key.as_ref();
        let cipher = S::new_cipher(key).map_err(|e| e.context("new", S::ALGORITHM))?;
        if defaults.mode == Mode::Ecb {
            warn!("{} encryptor defaults to ECB mode", S::ALGORITHM);
        }
        Ok(Self {
            key: SecureBytes::new(key),
            cipher,
            iv: None,
            iv_state: IvState::Unset,
            mode: defaults.mode,
            padding: defaults.padding,
            encoding: defaults.encoding,
            defaults,
            _system: PhantomData,
        })
    }

    // ---- 模式 ----

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.set_mode(mode);
        self
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::Ecb {
            warn!("ECB mode selected for {}; identical blocks leak", S::ALGORITHM);
        }
        self.mode = mode;
    }

    pub fn ecb(self) -> Self {
        self.with_mode(Mode::Ecb)
    }

    pub fn cbc(self) -> Self {
        self.with_mode(Mode::Cbc)
    }

    pub fn cfb(self) -> Self {
        self.with_mode(Mode::Cfb)
    }

    pub fn ofb(self) -> Self {
        self.with_mode(Mode::Ofb)
    }

    pub fn ctr(self) -> Self {
        self.with_mode(Mode::Ctr)
    }

    /// GCM 模式，只有 16 字节块的算法（AES、SM4）支持
    pub fn gcm(self) -> Self {
        self.with_mode(Mode::Gcm)
    }

    // ---- 填充 ----

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn no_padding(self) -> Self {
        self.with_padding(Padding::None)
    }

    pub fn pkcs7(self) -> Self {
        self.with_padding(Padding::Pkcs7)
    }

    pub fn zero_padding(self) -> Self {
        self.with_padding(Padding::Zero)
    }

    // ---- 编码 ----

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

    // ---- IV ----

    /// 提供 IV。长度必须等于块大小，之后的密文不再携带 IV 前缀。
    pub fn with_iv(mut self, iv: impl AsRef<[u8]>) -> Result<Self> {
        self.set_iv(iv)?;
        Ok(self)
    }

    /// 与 [`with_iv`](Self::with_iv) 相同，但 IV 长度非法时直接 panic
    pub fn must_with_iv(self, iv: impl AsRef<[u8]>) -> Self {
        match self.with_iv(iv) {
            Ok(encryptor) => encryptor,
            Err(err) => panic!("invalid IV for {}: {}", S::ALGORITHM, err),
        }
    }

    pub fn set_iv(&mut self, iv: impl AsRef<[u8]>) -> Result<()> {
        let iv = iv.as_ref();
        if iv.len() != S::BLOCK_SIZE {
            return Err(Error::InvalidConfiguration(format!(
                "IV must be {} bytes, got {}",
                S::BLOCK_SIZE,
                iv.len()
            ))
            .context("with_iv", S::ALGORITHM));
        }
        self.iv = Some(SecureBytes::new(iv));
        self.iv_state = IvState::Supplied;
        Ok(())
    }

    /// 擦除已保存的 IV，回到未设置状态，下次加密会重新生成
    pub fn clear_iv(&mut self) {
        if let Some(mut iv) = self.iv.take() {
            iv.zeroize();
        }
        self.iv_state = IvState::Unset;
    }

    // ---- 生命周期 ----

    /// 擦除 IV，并把模式、填充、编码恢复为构造时的默认值。密钥保持不变。
    pub fn reset(&mut self) {
        self.clear_iv();
        self.mode = self.defaults.mode;
        self.padding = self.defaults.padding;
        self.encoding = self.defaults.encoding;
        debug!("{} encryptor reset", S::ALGORITHM);
    }

    /// 更换密钥并重置
    pub fn rekey(&mut self, key: impl AsRef<[u8]>) -> Result<()> {
        let key = key.as_ref();
        self.cipher = S::new_cipher(key).map_err(|e| e.context("rekey", S::ALGORITHM))?;
        self.key = SecureBytes::new(key);
        self.reset();
        Ok(())
    }

    /// 将密钥清零，同时让分组密码不再持有原密钥的扩展结果
    pub(crate) fn wipe_key(&mut self) -> Result<()> {
        self.key.fill(0);
        self.cipher = S::new_cipher(&self.key)?;
        Ok(())
    }

    // ---- 访问器 ----

    pub fn algorithm(&self) -> Algorithm {
        S::ALGORITHM
    }

    pub fn block_size(&self) -> usize {
        S::BLOCK_SIZE
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// 当前保存的 IV 的副本
    pub fn iv(&self) -> Option<Vec<u8>> {
        self.iv.as_ref().map(SecureBytes::to_vec)
    }

    pub fn iv_state(&self) -> IvState {
        self.iv_state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// 当前策略下 IV 是否会写入密文
    pub fn iv_embedded(&self) -> bool {
        self.mode.needs_iv() && self.iv_state.policy() == IvPolicy::Embedded
    }

    fn engine(&self) -> ModeEngine {
        ModeEngine::new(self.mode, self.iv_state.policy())
    }

    // ---- 加解密 ----

    /// 加密：按需填充 → 模式引擎加密 → 编码
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_inner(plaintext)
            .map_err(|e| e.context("encrypt", S::ALGORITHM))
    }

    /// 解密：解码 → 模式引擎解密 → 按需去填充
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_inner(ciphertext)
            .map_err(|e| e.context("decrypt", S::ALGORITHM))
    }

    /// 加密并以字符串形式返回，`Raw` 编码不支持
    pub fn encrypt_to_string(&mut self, plaintext: &[u8]) -> Result<String> {
        if self.encoding == Encoding::Raw {
            return Err(Error::InvalidConfiguration(
                "raw encoding cannot be represented as text".to_string(),
            )
            .context("encrypt", S::ALGORITHM));
        }
        let encoded = self.encrypt(plaintext)?;
        String::from_utf8(encoded).map_err(|e| Error::DecodeFailure(e.to_string()))
    }

    fn encrypt_inner(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.ensure_iv()?;
        let data = if self.mode.is_block_mode() {
            Zeroizing::new(self.padding.pad(plaintext, S::BLOCK_SIZE)?)
        } else {
            Zeroizing::new(plaintext.to_vec())
        };
        let raw = self
            .engine()
            .encrypt(&self.cipher, self.iv.as_deref(), &data)?;
        Ok(self.encoding.encode(&raw))
    }

    fn decrypt_inner(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let raw = self.encoding.decode(ciphertext)?;
        let data = Zeroizing::new(
            self.engine()
                .decrypt(&self.cipher, self.iv.as_deref(), &raw)?,
        );
        if self.mode.is_block_mode() {
            self.padding.unpad(&data, S::BLOCK_SIZE)
        } else {
            Ok(data.to_vec())
        }
    }

    /// 需要 IV 且尚未设置时生成一个，之后一直复用
    fn ensure_iv(&mut self) -> Result<()> {
        if self.mode.needs_iv() && self.iv_state == IvState::Unset {
            self.iv = Some(SecureBytes::new(random_bytes(S::BLOCK_SIZE)?));
            self.iv_state = IvState::Generated;
            debug!(
                "generated {}-byte IV for {} {}",
                S::BLOCK_SIZE,
                S::ALGORITHM,
                self.mode
            );
        }
        Ok(())
    }
}

impl<S: SymmetricCryptographicSystem> Clone for SymmetricEncryptor<S> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            cipher: self.cipher.clone(),
            iv: self.iv.clone(),
            iv_state: self.iv_state,
            mode: self.mode,
            padding: self.padding,
            encoding: self.encoding,
            defaults: self.defaults,
            _system: PhantomData,
        }
    }
}

impl<S: SymmetricCryptographicSystem> fmt::Debug for SymmetricEncryptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricEncryptor")
            .field("algorithm", &S::ALGORITHM)
            .field("key", &self.key)
            .field("iv_state", &self.iv_state)
            .field("mode", &self.mode)
            .field("padding", &self.padding)
            .field("encoding", &self.encoding)
            .finish()
    }
}
