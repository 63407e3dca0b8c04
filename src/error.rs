//! Defines the custom error type for the `seal-cipher` crate.

use crate::common::algorithm::Algorithm;
use crate::symmetric::modes::Mode;
use thiserror::Error;

/// The main error type for the `seal-cipher` crate.
///
/// 错误信息中永远不会出现密钥、IV 或明文字节。
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid key length for {algorithm}: expected one of {expected:?}, got {actual}")]
    InvalidKeyLength {
        algorithm: Algorithm,
        expected: &'static [usize],
        actual: usize,
    },

    #[error("data length {len} is not a multiple of block size {block_size}")]
    InvalidLength { len: usize, block_size: usize },

    /// 填充校验失败。不携带任何细节，避免形成填充预言机。
    #[error("invalid padding")]
    InvalidPadding,

    #[error("ciphertext too short: need at least {expected} bytes, got {actual}")]
    CiphertextTooShort { expected: usize, actual: usize },

    /// GCM 认证失败，可能是数据被篡改。
    #[error("authentication failed")]
    AuthenticationFailure,

    #[error("decoding failed: {0}")]
    DecodeFailure(String),

    #[error("mode {mode} is not supported by {algorithm}")]
    UnsupportedMode { algorithm: Algorithm, mode: Mode },

    #[error("random source failure: {0}")]
    Random(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("signature error: {0}")]
    Signature(String),

    #[error("asymmetric operation failed: {0}")]
    Asymmetric(String),

    #[error("{0} key is not set")]
    MissingKey(&'static str),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{operation} failed for {algorithm}: {source}")]
    Operation {
        operation: &'static str,
        algorithm: Algorithm,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// 为错误附加操作名与算法上下文。
    pub(crate) fn context(self, operation: &'static str, algorithm: Algorithm) -> Self {
        Error::Operation {
            operation,
            algorithm,
            source: Box::new(self),
        }
    }

    /// 返回剥离所有上下文之后最内层的错误，便于按分类匹配。
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Operation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::DecodeFailure(format!("base64: {}", err))
    }
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Error::DecodeFailure(format!("hex: {}", err))
    }
}

impl From<rand_core::OsError> for Error {
    fn from(err: rand_core::OsError) -> Self {
        Error::Random(err.to_string())
    }
}

/// A specialized `Result` type for `seal-cipher` operations.
pub type Result<T> = std::result::Result<T, Error>;
