//!
//! # 通用配置模块
//!
//! 包含各加密器门面所使用的默认参数。所有字段都带有 `#[serde(default)]`，
//! 配置文件只需写出需要覆盖的部分。
//!
use crate::common::encoding::Encoding;
use crate::error::{Error, Result};
use crate::symmetric::modes::Mode;
use crate::symmetric::padding::Padding;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// SM2 签名默认使用的用户标识（GM/T 0009 推荐值）
pub const DEFAULT_SM2_UID: &str = "1234567812345678";

/// 对称加密器的默认模式、填充与编码，`reset()` 会恢复到这里的取值
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SymmetricDefaults {
    pub mode: Mode,
    pub padding: Padding,
    pub encoding: Encoding,
}

impl Default for SymmetricDefaults {
    fn default() -> Self {
        Self {
            mode: Mode::Cbc,
            padding: Padding::Pkcs7,
            encoding: Encoding::Base64,
        }
    }
}

/// 对象池配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PoolConfig {
    /// 池中最多保留的空闲实例数
    pub max_idle: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_idle: 32 }
    }
}

/// 加密配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CryptoConfig {
    /// 对称加密器默认值
    pub symmetric: SymmetricDefaults,
    /// RSA 密钥位数
    pub rsa_key_bits: usize,
    /// SM2 签名使用的用户标识
    pub sm2_uid: String,
    /// 对象池配置
    pub pool: PoolConfig,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            symmetric: SymmetricDefaults::default(),
            rsa_key_bits: 2048,
            sm2_uid: DEFAULT_SM2_UID.to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl CryptoConfig {
    /// 从 JSON 文本解析配置并校验
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CryptoConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// 将配置写入文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// 从环境变量加载配置，无法解析的取值会被忽略并保留默认值
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(mode) = parse_env::<Mode>("SEAL_CIPHER_MODE") {
            config.symmetric.mode = mode;
        }
        if let Some(padding) = parse_env::<Padding>("SEAL_CIPHER_PADDING") {
            config.symmetric.padding = padding;
        }
        if let Some(encoding) = parse_env::<Encoding>("SEAL_CIPHER_ENCODING") {
            config.symmetric.encoding = encoding;
        }
        if let Some(bits) = parse_env::<usize>("SEAL_CIPHER_RSA_BITS") {
            config.rsa_key_bits = bits;
        }
        if let Ok(uid) = std::env::var("SEAL_CIPHER_SM2_UID") {
            if !uid.is_empty() {
                config.sm2_uid = uid;
            }
        }
        if let Some(max_idle) = parse_env::<usize>("SEAL_CIPHER_POOL_MAX_IDLE") {
            config.pool.max_idle = max_idle;
        }

        config
    }

    /// 校验配置的取值范围
    pub fn validate(&self) -> Result<()> {
        validate_rsa_key_bits(self.rsa_key_bits)?;
        if self.sm2_uid.is_empty() {
            return Err(Error::InvalidConfiguration(
                "sm2_uid must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// RSA 密钥位数必须在 1024..=4096 之间且为 8 的倍数
pub(crate) fn validate_rsa_key_bits(bits: usize) -> Result<()> {
    if !(1024..=4096).contains(&bits) || bits % 8 != 0 {
        return Err(Error::InvalidConfiguration(format!(
            "RSA key size must be a multiple of 8 within 1024..=4096, got {}",
            bits
        )));
    }
    Ok(())
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring invalid value for {}", name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_crypto_config_default() {
        let config = CryptoConfig::default();

        assert_eq!(config.symmetric.mode, Mode::Cbc);
        assert_eq!(config.symmetric.padding, Padding::Pkcs7);
        assert_eq!(config.symmetric.encoding, Encoding::Base64);
        assert_eq!(config.rsa_key_bits, 2048);
        assert_eq!(config.sm2_uid, DEFAULT_SM2_UID);
        assert_eq!(config.pool.max_idle, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            CryptoConfig::from_json(r#"{ "symmetric": { "mode": "ctr", "encoding": "hex" } }"#)
                .unwrap();
        assert_eq!(config.symmetric.mode, Mode::Ctr);
        assert_eq!(config.symmetric.encoding, Encoding::Hex);
        assert_eq!(config.symmetric.padding, Padding::Pkcs7);
        assert_eq!(config.rsa_key_bits, 2048);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_bits = CryptoConfig {
            rsa_key_bits: 1000,
            ..Default::default()
        };
        assert!(matches!(
            bad_bits.validate(),
            Err(Error::InvalidConfiguration(_))
        ));

        let empty_uid = CryptoConfig {
            sm2_uid: String::new(),
            ..Default::default()
        };
        assert!(empty_uid.validate().is_err());

        assert!(CryptoConfig::from_json(r#"{ "rsa_key_bits": 8192 }"#).is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let config = CryptoConfig {
            rsa_key_bits: 3072,
            pool: PoolConfig { max_idle: 4 },
            ..Default::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seal-cipher.json");
        config.save_to_file(&path).unwrap();

        let loaded = CryptoConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_file_reports_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            CryptoConfig::from_file(file.path()),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CryptoConfig::from_file(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
