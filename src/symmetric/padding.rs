//! 填充策略。
//!
//! 填充只作用于 ECB / CBC 这类分组变换模式，流式模式（CFB、OFB、CTR、GCM）从不填充。
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PKCS#7 允许的最大块大小
const MAX_PKCS7_BLOCK_SIZE: usize = 256;

/// 填充方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    /// 不填充，要求数据长度已是块大小的整数倍
    None,
    /// PKCS#7：追加 n 个值为 n 的字节
    #[default]
    Pkcs7,
    /// 零填充：追加 n 个 0x00。去填充时会剥掉明文末尾本身的零字节，这是该方案固有的有损性
    Zero,
}

impl Padding {
    /// 将数据填充到块大小的整数倍
    pub fn pad(&self, data: &[u8], block_size: usize) -> Result<Vec<u8>> {
        match self {
            Padding::None => {
                if block_size == 0 || data.len() % block_size != 0 {
                    return Err(Error::InvalidLength {
                        len: data.len(),
                        block_size,
                    });
                }
                Ok(data.to_vec())
            }
            Padding::Pkcs7 => {
                check_pkcs7_block_size(block_size)?;
                let n = block_size - data.len() % block_size;
                // 块大小为 256 且数据已对齐时，填充值无法用一个字节表示
                let value = u8::try_from(n).map_err(|_| {
                    Error::InvalidConfiguration(format!(
                        "PKCS7 padding length {} does not fit in a byte",
                        n
                    ))
                })?;
                let mut padded = Vec::with_capacity(data.len() + n);
                padded.extend_from_slice(data);
                padded.resize(data.len() + n, value);
                Ok(padded)
            }
            Padding::Zero => {
                check_nonzero_block_size(block_size)?;
                let n = block_size - data.len() % block_size;
                let mut padded = Vec::with_capacity(data.len() + n);
                padded.extend_from_slice(data);
                padded.resize(data.len() + n, 0);
                Ok(padded)
            }
        }
    }

    /// 去除填充
    pub fn unpad(&self, data: &[u8], block_size: usize) -> Result<Vec<u8>> {
        match self {
            Padding::None => Ok(data.to_vec()),
            Padding::Pkcs7 => {
                check_pkcs7_block_size(block_size)?;
                let Some(&last) = data.last() else {
                    return Err(Error::InvalidPadding);
                };
                if data.len() % block_size != 0 {
                    return Err(Error::InvalidPadding);
                }
                let n = last as usize;
                if n == 0 || n > block_size {
                    return Err(Error::InvalidPadding);
                }
                // 无论哪个字节不匹配都检查完全部填充字节
                let mut diff = 0u8;
                for &byte in &data[data.len() - n..] {
                    diff |= byte ^ last;
                }
                if diff != 0 {
                    return Err(Error::InvalidPadding);
                }
                Ok(data[..data.len() - n].to_vec())
            }
            Padding::Zero => {
                check_nonzero_block_size(block_size)?;
                if data.is_empty() || data.len() % block_size != 0 {
                    return Err(Error::InvalidPadding);
                }
                let end = data
                    .iter()
                    .rposition(|&byte| byte != 0)
                    .map_or(0, |index| index + 1);
                Ok(data[..end].to_vec())
            }
        }
    }
}

fn check_pkcs7_block_size(block_size: usize) -> Result<()> {
    if block_size == 0 || block_size > MAX_PKCS7_BLOCK_SIZE {
        return Err(Error::InvalidConfiguration(format!(
            "PKCS7 block size must be within 1..=256, got {}",
            block_size
        )));
    }
    Ok(())
}

fn check_nonzero_block_size(block_size: usize) -> Result<()> {
    if block_size == 0 {
        return Err(Error::InvalidConfiguration(
            "block size must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Padding::None => "none",
            Padding::Pkcs7 => "pkcs7",
            Padding::Zero => "zero",
        };
        f.write_str(name)
    }
}

impl FromStr for Padding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "nopadding" => Ok(Padding::None),
            "pkcs7" | "pkcs5" => Ok(Padding::Pkcs7),
            "zero" | "zeropadding" => Ok(Padding::Zero),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown padding: {}",
                other
            ))),
        }
    }
}
