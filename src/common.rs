//! 通用模块：算法标识、配置、编码策略、随机数源与安全工具。
pub mod algorithm;
pub mod config;
pub mod encoding;
pub mod random;
pub mod utils;
