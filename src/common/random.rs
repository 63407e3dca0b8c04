//! 密码学安全随机数源。
//!
//! 所有 IV 与 GCM nonce 都经由本模块生成。测试可以通过 [`set_random_source`]
//! 注入确定性的随机源，全局只有一个受互斥锁保护的替换点，
//! 因此并发生成 IV 时不会交错读取同一个随机源。
use crate::error::Result;
use log::debug;
use rand_core::{OsRng, RngCore, TryRngCore};
use std::sync::{Mutex, PoisonError};

/// 可替换的随机源
pub type RandomSource = Box<dyn RngCore + Send>;

static RANDOM_SOURCE: Mutex<Option<RandomSource>> = Mutex::new(None);

/// 用随机字节填满 `dest`
pub fn fill_random(dest: &mut [u8]) -> Result<()> {
    let mut source = RANDOM_SOURCE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    match source.as_mut() {
        Some(rng) => rng.fill_bytes(dest),
        None => OsRng.try_fill_bytes(dest)?,
    }
    Ok(())
}

/// 生成 `len` 个随机字节
pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// 替换全局随机源，传入 `None` 恢复操作系统 CSPRNG。
///
/// 仅应在测试中使用。
pub fn set_random_source(source: Option<RandomSource>) {
    let mut current = RANDOM_SOURCE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    debug!(
        "random source switched to {}",
        if source.is_some() { "custom" } else { "os" }
    );
    *current = source;
}
