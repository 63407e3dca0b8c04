//! 传统非对称算法
pub mod rsa;
