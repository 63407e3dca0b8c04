//! 输出编码策略。
//!
//! 编码层只负责传输表示，加密时最后一步执行，解密时第一步执行，
//! 与密码学逻辑完全无关。
use crate::error::{Error, Result};
use base64::{Engine, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 密文 / 签名的文本表示方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// 原始字节，不做任何转换
    Raw,
    /// 标准 Base64 字母表，带填充
    #[default]
    Base64,
    /// URL 安全 Base64 字母表，带填充
    Base64Url,
    /// 小写十六进制
    Hex,
}

impl Encoding {
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Encoding::Raw => data.to_vec(),
            Encoding::Base64 => general_purpose::STANDARD.encode(data).into_bytes(),
            Encoding::Base64Url => general_purpose::URL_SAFE.encode(data).into_bytes(),
            Encoding::Hex => hex::encode(data).into_bytes(),
        }
    }

    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Encoding::Raw => Ok(data.to_vec()),
            Encoding::Base64 => Ok(general_purpose::STANDARD.decode(data)?),
            Encoding::Base64Url => Ok(general_purpose::URL_SAFE.decode(data)?),
            Encoding::Hex => Ok(hex::decode(data)?),
        }
    }

    /// 编码为字符串。`Raw` 编码的输出不一定是合法 UTF-8，因此返回错误。
    pub fn encode_to_string(&self, data: &[u8]) -> Result<String> {
        match self {
            Encoding::Raw => Err(Error::InvalidConfiguration(
                "raw encoding cannot be represented as text".to_string(),
            )),
            _ => String::from_utf8(self.encode(data))
                .map_err(|e| Error::DecodeFailure(e.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Raw => "raw",
            Encoding::Base64 => "base64",
            Encoding::Base64Url => "base64url",
            Encoding::Hex => "hex",
        };
        f.write_str(name)
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "none" => Ok(Encoding::Raw),
            "base64" => Ok(Encoding::Base64),
            "base64url" | "base64-url" | "base64_url" => Ok(Encoding::Base64Url),
            "hex" => Ok(Encoding::Hex),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown encoding: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &[u8] = &[0xfb, 0xff, 0x00, 0x10, 0x7e];

    #[test]
    fn test_known_renderings() {
        assert_eq!(Encoding::Base64.encode(DATA), b"+/8AEH4=");
        assert_eq!(Encoding::Base64Url.encode(DATA), b"-_8AEH4=");
        assert_eq!(Encoding::Hex.encode(DATA), b"fbff00107e");
        assert_eq!(Encoding::Raw.encode(DATA), DATA);
    }

    #[test]
    fn test_decode_inverts_encode() {
        for encoding in [
            Encoding::Raw,
            Encoding::Base64,
            Encoding::Base64Url,
            Encoding::Hex,
        ] {
            let encoded = encoding.encode(DATA);
            assert_eq!(encoding.decode(&encoded).unwrap(), DATA, "{}", encoding);
        }
    }

    #[test]
    fn test_malformed_input_is_decode_failure() {
        assert!(matches!(
            Encoding::Base64.decode(b"not base64!"),
            Err(Error::DecodeFailure(_))
        ));
        assert!(matches!(
            Encoding::Base64Url.decode(b"+/8AEH4="),
            Err(Error::DecodeFailure(_))
        ));
        assert!(matches!(
            Encoding::Hex.decode(b"abc"),
            Err(Error::DecodeFailure(_))
        ));
        assert!(matches!(
            Encoding::Hex.decode(b"zz"),
            Err(Error::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_encode_to_string() {
        assert_eq!(Encoding::Hex.encode_to_string(DATA).unwrap(), "fbff00107e");
        assert!(Encoding::Raw.encode_to_string(DATA).is_err());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("BASE64URL".parse::<Encoding>().unwrap(), Encoding::Base64Url);
        assert_eq!("Hex".parse::<Encoding>().unwrap(), Encoding::Hex);
        assert_eq!("raw".parse::<Encoding>().unwrap(), Encoding::Raw);
        assert!("base32".parse::<Encoding>().is_err());
    }
}
