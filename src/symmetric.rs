//! 对称加密核心模块
//!
//! 自底向上依次为：填充策略、分组密码原语、分组模式引擎、
//! 各算法系统，以及组合它们的链式加密器门面与对象池。

pub mod encryptor;
pub mod modes;
pub mod padding;
pub mod pool;
pub mod primitive;
pub mod systems;
pub mod traits;
