//! # Seal-Cipher: Chainable Block Cipher and Public-Key Façade
//!
//! `seal-cipher` offers one fluent API over AES, DES, 3DES and SM4 block ciphers
//! (ECB, CBC, CFB, OFB, CTR and GCM modes; no, PKCS#7 or zero padding; raw,
//! Base64, URL-safe Base64 or hex output) and over RSA and SM2 public-key operations.
//!
//! ## Core Concepts
//!
//! - **`SymmetricEncryptor`**: owns a key, an optional IV and the mode / padding /
//!   encoding choice. `AesEncryptor`, `DesEncryptor`, `TripleDesEncryptor` and
//!   `Sm4Encryptor` are ready-made aliases.
//! - **IV handling**: an IV generated by the encryptor is prefixed to the ciphertext;
//!   an IV supplied through `with_iv` is kept out of the ciphertext and must be
//!   supplied again to decrypt. GCM always draws a fresh nonce per call.
//! - **`EncryptorPool`**: an explicitly constructed pool that lends exclusive
//!   encryptors and resets them on return.
//! - **`RsaEncryptor` / `Sm2Encryptor`**: PEM key exchange, encrypt/decrypt and
//!   sign/verify, rendered through the same encodings.
//!
//! ## Quick Start
//!
//! ```rust
//! use seal_cipher::AesEncryptor;
//!
//! fn main() -> seal_cipher::Result<()> {
//!     let mut encryptor = AesEncryptor::new(b"0123456789abcdef")?
//!         .with_iv(b"abcdefghijklmnop")?
//!         .cbc()
//!         .pkcs7()
//!         .base64();
//!
//!     let ciphertext = encryptor.encrypt(b"123456")?;
//!     assert_eq!(encryptor.encrypt(b"123456")?, ciphertext);
//!     assert_eq!(encryptor.decrypt(&ciphertext)?, b"123456");
//!     Ok(())
//! }
//! ```

pub mod common;
pub mod error;
pub mod symmetric;

#[cfg(any(feature = "traditional", feature = "sm2"))]
pub mod asymmetric;

pub use common::algorithm::Algorithm;
pub use common::config::CryptoConfig;
pub use common::encoding::Encoding;
pub use error::{Error, Result};
pub use symmetric::encryptor::SymmetricEncryptor;
pub use symmetric::modes::{IvPolicy, IvState, Mode};
pub use symmetric::padding::Padding;
pub use symmetric::pool::{EncryptorPool, PoolMetrics};
pub use symmetric::systems::{
    AesEncryptor, AesSystem, DesEncryptor, DesSystem, Sm4Encryptor, Sm4System,
    TripleDesEncryptor, TripleDesSystem,
};

#[cfg(any(feature = "traditional", feature = "sm2"))]
pub use asymmetric::traits::AsymmetricEncryptor;

#[cfg(feature = "traditional")]
pub use asymmetric::systems::traditional::rsa::RsaEncryptor;

#[cfg(feature = "sm2")]
pub use asymmetric::systems::sm2::Sm2Encryptor;

/// 常用类型与 Trait 的集合
pub mod prelude {
    pub use crate::common::encoding::Encoding;
    pub use crate::error::{Error, Result};
    pub use crate::symmetric::encryptor::SymmetricEncryptor;
    pub use crate::symmetric::modes::{IvState, Mode};
    pub use crate::symmetric::padding::Padding;
    pub use crate::symmetric::traits::SymmetricCryptographicSystem;

    #[cfg(any(feature = "traditional", feature = "sm2"))]
    pub use crate::asymmetric::traits::AsymmetricEncryptor;
}
