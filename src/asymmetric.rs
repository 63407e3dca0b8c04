//! 非对称加密模块
//!
//! RSA 与 SM2 门面复用对称部分的 [`Encoding`](crate::common::encoding::Encoding)
//! 作为密文与签名的输出表示。

pub mod systems;
pub mod traits;
