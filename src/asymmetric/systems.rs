//! 非对称算法系统集合
#[cfg(feature = "sm2")]
pub mod sm2;
#[cfg(feature = "traditional")]
pub mod traditional;
