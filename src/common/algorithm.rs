//! 算法标识。
use serde::{Deserialize, Serialize};
use std::fmt;

/// 本库支持的全部算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Aes,
    Des,
    #[serde(rename = "3des")]
    TripleDes,
    Sm4,
    Rsa,
    Sm2,
}

impl Algorithm {
    /// 是否为对称分组密码
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self,
            Algorithm::Aes | Algorithm::Des | Algorithm::TripleDes | Algorithm::Sm4
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Aes => "AES",
            Algorithm::Des => "DES",
            Algorithm::TripleDes => "3DES",
            Algorithm::Sm4 => "SM4",
            Algorithm::Rsa => "RSA",
            Algorithm::Sm2 => "SM2",
        };
        f.write_str(name)
    }
}
