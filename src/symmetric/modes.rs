//! 分组模式引擎。
//!
//! 引擎本身无状态，每次调用由 `{mode, iv_policy}` 参数化：
//!
//! | 模式 | 自动生成 IV (`Embedded`) | 调用方提供 IV (`Supplied`) |
//! |---|---|---|
//! | ECB | 密文 | 不适用 |
//! | CBC/CFB/OFB/CTR | `iv || 密文` | 仅密文 |
//! | GCM | `nonce || 密文 || tag` | 同左，nonce 总是内嵌且每次新生成 |
use crate::common::utils::xor_in_place;
use crate::error::{Error, Result};
use crate::symmetric::primitive::BlockCipherKind;
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 分组密码工作模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Ecb,
    #[default]
    Cbc,
    Cfb,
    Ofb,
    Ctr,
    Gcm,
}

impl Mode {
    /// 是否需要与块大小等长的 IV
    pub fn needs_iv(&self) -> bool {
        matches!(self, Mode::Cbc | Mode::Cfb | Mode::Ofb | Mode::Ctr)
    }

    /// 是否为需要填充的分组变换模式
    pub fn is_block_mode(&self) -> bool {
        matches!(self, Mode::Ecb | Mode::Cbc)
    }

    /// 是否为认证加密模式
    pub fn is_aead(&self) -> bool {
        matches!(self, Mode::Gcm)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Ecb => "ECB",
            Mode::Cbc => "CBC",
            Mode::Cfb => "CFB",
            Mode::Ofb => "OFB",
            Mode::Ctr => "CTR",
            Mode::Gcm => "GCM",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ecb" => Ok(Mode::Ecb),
            "cbc" => Ok(Mode::Cbc),
            "cfb" => Ok(Mode::Cfb),
            "ofb" => Ok(Mode::Ofb),
            "ctr" => Ok(Mode::Ctr),
            "gcm" => Ok(Mode::Gcm),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown mode: {}",
                other
            ))),
        }
    }
}

/// IV 的放置策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IvPolicy {
    /// IV 自动生成，作为前缀嵌入密文
    Embedded,
    /// IV 由调用方提供并自行保管，密文不带前缀
    Supplied,
}

/// 门面上 IV 的生命周期状态
///
/// `Unset → Generated → 复用` 或 `Unset → Supplied → 复用`，
/// 只有调用方显式清除或重置才会回到 `Unset`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IvState {
    #[default]
    Unset,
    Generated,
    Supplied,
}

impl IvState {
    pub fn policy(&self) -> IvPolicy {
        match self {
            IvState::Supplied => IvPolicy::Supplied,
            IvState::Unset | IvState::Generated => IvPolicy::Embedded,
        }
    }
}

/// 分组模式引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeEngine {
    mode: Mode,
    policy: IvPolicy,
}

impl ModeEngine {
    pub fn new(mode: Mode, policy: IvPolicy) -> Self {
        Self { mode, policy }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn policy(&self) -> IvPolicy {
        self.policy
    }

    /// 加密已按需填充的数据。
    ///
    /// 需要 IV 的模式必须传入与块大小等长的 `iv`；`Embedded` 策略下输出以 IV 开头。
    pub fn encrypt(
        &self,
        cipher: &BlockCipherKind,
        iv: Option<&[u8]>,
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        trace!(
            "{} {} encrypt ({:?}), {} bytes",
            cipher.algorithm(),
            self.mode,
            self.policy,
            plaintext.len()
        );
        match self.mode {
            Mode::Ecb => ecb_encrypt(cipher, plaintext),
            Mode::Gcm => cipher.seal_gcm(plaintext),
            mode => {
                let iv = check_iv(cipher, iv)?;
                let body = match mode {
                    Mode::Cbc => cbc_encrypt(cipher, iv, plaintext)?,
                    Mode::Cfb => cfb_encrypt(cipher, iv, plaintext),
                    Mode::Ofb => ofb_apply(cipher, iv, plaintext),
                    _ => ctr_apply(cipher, iv, plaintext),
                };
                Ok(match self.policy {
                    IvPolicy::Embedded => [iv, body.as_slice()].concat(),
                    IvPolicy::Supplied => body,
                })
            }
        }
    }

    /// 解密，返回仍带填充的明文。
    ///
    /// `Embedded` 策略下忽略 `iv` 参数，改为从密文前缀读取。
    pub fn decrypt(
        &self,
        cipher: &BlockCipherKind,
        iv: Option<&[u8]>,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        trace!(
            "{} {} decrypt ({:?}), {} bytes",
            cipher.algorithm(),
            self.mode,
            self.policy,
            ciphertext.len()
        );
        match self.mode {
            Mode::Ecb => ecb_decrypt(cipher, ciphertext),
            Mode::Gcm => cipher.open_gcm(ciphertext),
            mode => {
                let (iv, body) = match self.policy {
                    IvPolicy::Embedded => {
                        let block_size = cipher.block_size();
                        if ciphertext.len() < block_size {
                            return Err(Error::CiphertextTooShort {
                                expected: block_size,
                                actual: ciphertext.len(),
                            });
                        }
                        ciphertext.split_at(block_size)
                    }
                    IvPolicy::Supplied => (check_iv(cipher, iv)?, ciphertext),
                };
                match mode {
                    Mode::Cbc => cbc_decrypt(cipher, iv, body),
                    Mode::Cfb => Ok(cfb_decrypt(cipher, iv, body)),
                    Mode::Ofb => Ok(ofb_apply(cipher, iv, body)),
                    _ => Ok(ctr_apply(cipher, iv, body)),
                }
            }
        }
    }
}

fn check_iv<'a>(cipher: &BlockCipherKind, iv: Option<&'a [u8]>) -> Result<&'a [u8]> {
    let block_size = cipher.block_size();
    match iv {
        Some(iv) if iv.len() == block_size => Ok(iv),
        Some(iv) => Err(Error::InvalidConfiguration(format!(
            "IV must be {} bytes, got {}",
            block_size,
            iv.len()
        ))),
        None => Err(Error::InvalidConfiguration(
            "mode requires an IV but none is set".to_string(),
        )),
    }
}

fn check_aligned(cipher: &BlockCipherKind, data: &[u8]) -> Result<()> {
    let block_size = cipher.block_size();
    if data.len() % block_size != 0 {
        return Err(Error::InvalidLength {
            len: data.len(),
            block_size,
        });
    }
    Ok(())
}

fn ecb_encrypt(cipher: &BlockCipherKind, data: &[u8]) -> Result<Vec<u8>> {
    check_aligned(cipher, data)?;
    let mut out = data.to_vec();
    for block in out.chunks_exact_mut(cipher.block_size()) {
        cipher.encrypt_block(block);
    }
    Ok(out)
}

fn ecb_decrypt(cipher: &BlockCipherKind, data: &[u8]) -> Result<Vec<u8>> {
    check_aligned(cipher, data)?;
    let mut out = data.to_vec();
    for block in out.chunks_exact_mut(cipher.block_size()) {
        cipher.decrypt_block(block);
    }
    Ok(out)
}

fn cbc_encrypt(cipher: &BlockCipherKind, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    check_aligned(cipher, data)?;
    let mut out = data.to_vec();
    let mut prev = iv.to_vec();
    for block in out.chunks_exact_mut(cipher.block_size()) {
        xor_in_place(block, &prev);
        cipher.encrypt_block(block);
        prev.copy_from_slice(block);
    }
    Ok(out)
}

fn cbc_decrypt(cipher: &BlockCipherKind, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    check_aligned(cipher, data)?;
    let mut out = data.to_vec();
    let mut prev = iv.to_vec();
    for block in out.chunks_exact_mut(cipher.block_size()) {
        let saved = block.to_vec();
        cipher.decrypt_block(block);
        xor_in_place(block, &prev);
        prev = saved;
    }
    Ok(out)
}

// 整块反馈的 CFB，最后一个分段可以不足一块
fn cfb_encrypt(cipher: &BlockCipherKind, iv: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    let mut register = iv.to_vec();
    for segment in out.chunks_mut(cipher.block_size()) {
        cipher.encrypt_block(&mut register);
        xor_in_place(segment, &register);
        register[..segment.len()].copy_from_slice(segment);
    }
    out
}

fn cfb_decrypt(cipher: &BlockCipherKind, iv: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    let mut register = iv.to_vec();
    for segment in out.chunks_mut(cipher.block_size()) {
        cipher.encrypt_block(&mut register);
        let keystream = register.clone();
        register[..segment.len()].copy_from_slice(segment);
        xor_in_place(segment, &keystream);
    }
    out
}

fn ofb_apply(cipher: &BlockCipherKind, iv: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    let mut keystream = iv.to_vec();
    for segment in out.chunks_mut(cipher.block_size()) {
        cipher.encrypt_block(&mut keystream);
        xor_in_place(segment, &keystream);
    }
    out
}

fn ctr_apply(cipher: &BlockCipherKind, iv: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    let mut counter = iv.to_vec();
    let mut keystream = vec![0u8; counter.len()];
    for segment in out.chunks_mut(cipher.block_size()) {
        keystream.copy_from_slice(&counter);
        cipher.encrypt_block(&mut keystream);
        xor_in_place(segment, &keystream);
        increment_counter(&mut counter);
    }
    out
}

/// 将整个计数器块视为大端整数加一，溢出时回绕
fn increment_counter(counter: &mut [u8]) {
    for byte in counter.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}
