//! # Symmetric Cryptographic Systems Module
//!
//! Each supported block cipher is described by a marker type implementing
//! `SymmetricCryptographicSystem`, and paired with a ready-to-use encryptor alias.
//!
//! ---
//!
//! # 对称加密系统模块
//!
//! 每种分组密码由一个实现 `SymmetricCryptographicSystem` 的标记类型描述，
//! 并配有一个可以直接使用的加密器类型别名。

pub mod aes;
pub mod des;
pub mod sm4;
pub mod triple_des;

pub use self::aes::{AesEncryptor, AesSystem};
pub use self::des::{DesEncryptor, DesSystem};
pub use self::sm4::{Sm4Encryptor, Sm4System};
pub use self::triple_des::{TripleDesEncryptor, TripleDesSystem};
