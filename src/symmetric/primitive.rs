//! 原始分组密码原语。
//!
//! 算法集合是封闭的，因此用一个和类型承载所有已初始化的分组密码，
//! 由模式引擎统一调度单块加解密与 GCM。
use crate::common::algorithm::Algorithm;
use crate::common::random::fill_random;
use crate::error::{Error, Result};
use crate::symmetric::modes::Mode;
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::AesGcm;
use aes_gcm::aead::{Aead, AeadCore};
use cipher::consts::{U12, U16};
use cipher::generic_array::GenericArray;
use cipher::typenum::Unsigned;
use cipher::{BlockCipher, BlockDecrypt, BlockEncrypt, BlockSizeUser, KeyInit};
use des::{Des, TdesEde3};
use log::warn;
use sm4::Sm4;

/// 已完成密钥扩展的分组密码
#[derive(Clone)]
pub enum BlockCipherKind {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
    Des(Des),
    TripleDes(TdesEde3),
    Sm4(Sm4),
}

impl BlockCipherKind {
    /// 根据算法与密钥长度选择具体的分组密码
    pub fn new(algorithm: Algorithm, key: &[u8]) -> Result<Self> {
        let cipher = match (algorithm, key.len()) {
            (Algorithm::Aes, 16) => Aes128::new_from_slice(key).map(Self::Aes128),
            (Algorithm::Aes, 24) => Aes192::new_from_slice(key).map(Self::Aes192),
            (Algorithm::Aes, 32) => Aes256::new_from_slice(key).map(Self::Aes256),
            (Algorithm::Des, 8) => Des::new_from_slice(key).map(Self::Des),
            (Algorithm::TripleDes, 24) => TdesEde3::new_from_slice(key).map(Self::TripleDes),
            (Algorithm::Sm4, 16) => Sm4::new_from_slice(key).map(Self::Sm4),
            (algorithm, actual) if algorithm.is_symmetric() => {
                return Err(Error::InvalidKeyLength {
                    algorithm,
                    expected: key_sizes(algorithm),
                    actual,
                });
            }
            (algorithm, _) => {
                return Err(Error::InvalidConfiguration(format!(
                    "{} is not a block cipher",
                    algorithm
                )));
            }
        };
        cipher.map_err(|_| Error::InvalidKeyLength {
            algorithm,
            expected: key_sizes(algorithm),
            actual: key.len(),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Aes128(_) | Self::Aes192(_) | Self::Aes256(_) => Algorithm::Aes,
            Self::Des(_) => Algorithm::Des,
            Self::TripleDes(_) => Algorithm::TripleDes,
            Self::Sm4(_) => Algorithm::Sm4,
        }
    }

    pub fn block_size(&self) -> usize {
        match self {
            Self::Des(_) | Self::TripleDes(_) => 8,
            _ => 16,
        }
    }

    /// 原地加密一个块，`block` 的长度必须等于块大小
    pub(crate) fn encrypt_block(&self, block: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes192(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes256(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::Des(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::TripleDes(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::Sm4(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
        }
    }

    /// 原地解密一个块，`block` 的长度必须等于块大小
    pub(crate) fn decrypt_block(&self, block: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes192(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes256(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::Des(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::TripleDes(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::Sm4(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
        }
    }

    /// GCM 加密，输出 `nonce || ciphertext || tag`，每次调用都生成新的 nonce
    pub(crate) fn seal_gcm(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Aes128(c) => gcm_seal(c, plaintext),
            Self::Aes192(c) => gcm_seal(c, plaintext),
            Self::Aes256(c) => gcm_seal(c, plaintext),
            Self::Sm4(c) => gcm_seal(c, plaintext),
            Self::Des(_) | Self::TripleDes(_) => Err(self.gcm_unsupported()),
        }
    }

    /// GCM 解密并校验认证标签
    pub(crate) fn open_gcm(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Aes128(c) => gcm_open(c, sealed),
            Self::Aes192(c) => gcm_open(c, sealed),
            Self::Aes256(c) => gcm_open(c, sealed),
            Self::Sm4(c) => gcm_open(c, sealed),
            Self::Des(_) | Self::TripleDes(_) => Err(self.gcm_unsupported()),
        }
    }

    fn gcm_unsupported(&self) -> Error {
        Error::UnsupportedMode {
            algorithm: self.algorithm(),
            mode: Mode::Gcm,
        }
    }
}

/// 各算法允许的密钥长度
pub(crate) fn key_sizes(algorithm: Algorithm) -> &'static [usize] {
    match algorithm {
        Algorithm::Aes => &[16, 24, 32],
        Algorithm::Des => &[8],
        Algorithm::TripleDes => &[24],
        Algorithm::Sm4 => &[16],
        Algorithm::Rsa | Algorithm::Sm2 => &[],
    }
}

type Gcm<C> = AesGcm<C, U12>;

/// GCM nonce 长度，由 AEAD 类型决定
pub(crate) fn gcm_nonce_size<C>() -> usize
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt,
{
    <<Gcm<C> as AeadCore>::NonceSize as Unsigned>::USIZE
}

/// GCM 认证标签长度，由 AEAD 类型决定
pub(crate) fn gcm_tag_size<C>() -> usize
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt,
{
    <<Gcm<C> as AeadCore>::TagSize as Unsigned>::USIZE
}

fn gcm_seal<C>(cipher: &C, plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + Clone,
{
    let aead = Gcm::<C>::from(cipher.clone());
    let nonce_size = gcm_nonce_size::<C>();
    let mut nonce = vec![0u8; nonce_size];
    fill_random(&mut nonce)?;

    let sealed = aead
        .encrypt(GenericArray::from_slice(&nonce), plaintext)
        .map_err(|_| {
            Error::InvalidConfiguration("plaintext exceeds the GCM message limit".to_string())
        })?;

    let mut output = Vec::with_capacity(nonce_size + sealed.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&sealed);
    Ok(output)
}

fn gcm_open<C>(cipher: &C, sealed: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + Clone,
{
    let nonce_size = gcm_nonce_size::<C>();
    if sealed.len() < nonce_size + gcm_tag_size::<C>() {
        warn!("GCM ciphertext shorter than nonce and tag");
        return Err(Error::AuthenticationFailure);
    }
    let (nonce, body) = sealed.split_at(nonce_size);
    let aead = Gcm::<C>::from(cipher.clone());
    aead.decrypt(GenericArray::from_slice(nonce), body)
        .map_err(|_| {
            warn!("GCM authentication failed");
            Error::AuthenticationFailure
        })
}
