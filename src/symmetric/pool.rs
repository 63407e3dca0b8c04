//! 对称加密器对象池。
//!
//! 池是一个显式构造的对象，由调用方在启动时创建并按引用传递，
//! 不存在任何全局单例。借出的实例由借用方独占，归还时必定先 `reset()` 并擦除密钥。
use crate::common::config::CryptoConfig;
use crate::error::Result;
use crate::symmetric::encryptor::SymmetricEncryptor;
use crate::symmetric::traits::SymmetricCryptographicSystem;
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// 池的使用统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolMetrics {
    /// 当前借出未归还的实例数
    pub active: usize,
    /// 新建的实例总数
    pub created: usize,
    /// 复用空闲实例的次数
    pub reused: usize,
}

/// 线程安全的对称加密器池
pub struct EncryptorPool<S: SymmetricCryptographicSystem> {
    config: CryptoConfig,
    idle: Mutex<Vec<SymmetricEncryptor<S>>>,
    active: AtomicUsize,
    created: AtomicUsize,
    reused: AtomicUsize,
}

impl<S: SymmetricCryptographicSystem> EncryptorPool<S> {
    pub fn new(config: CryptoConfig) -> Self {
        Self {
            config,
            idle: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
        }
    }

    /// 借出一个使用 `key` 的加密器，模式、填充、编码为配置中的默认值
    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<SymmetricEncryptor<S>> {
        let key = key.as_ref();
        let recycled = self.lock_idle().pop();

        let encryptor = match recycled {
            Some(mut encryptor) => {
                if let Err(err) = encryptor.rekey(key) {
                    self.lock_idle().push(encryptor);
                    return Err(err.context("pool get", S::ALGORITHM));
                }
                self.reused.fetch_add(1, Ordering::Relaxed);
                encryptor
            }
            None => {
                let encryptor = SymmetricEncryptor::with_config(key, &self.config)
                    .map_err(|e| e.context("pool get", S::ALGORITHM))?;
                self.created.fetch_add(1, Ordering::Relaxed);
                encryptor
            }
        };

        self.active.fetch_add(1, Ordering::Relaxed);
        debug!("{} pool lent an encryptor", S::ALGORITHM);
        Ok(encryptor)
    }

    /// 归还加密器。实例会被重置并擦除密钥，空闲数达到上限时直接丢弃。
    pub fn put(&self, mut encryptor: SymmetricEncryptor<S>) {
        let _ = self
            .active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));

        encryptor.reset();
        if encryptor.wipe_key().is_err() {
            return;
        }

        let mut idle = self.lock_idle();
        if idle.len() < self.config.pool.max_idle {
            idle.push(encryptor);
            debug!("{} pool holds {} idle encryptors", S::ALGORITHM, idle.len());
        }
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            active: self.active.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
        }
    }

    /// 当前空闲实例数
    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    fn lock_idle(&self) -> std::sync::MutexGuard<'_, Vec<SymmetricEncryptor<S>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: SymmetricCryptographicSystem> Default for EncryptorPool<S> {
    fn default() -> Self {
        Self::new(CryptoConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::PoolConfig;
    use crate::symmetric::modes::{IvState, Mode};
    use crate::symmetric::systems::{AesSystem, Sm4System};

    #[test]
    fn test_get_put_reuses_instances() {
        let pool: EncryptorPool<AesSystem> = EncryptorPool::default();

        let enc = pool.get([1u8; 16]).unwrap();
        assert_eq!(
            pool.metrics(),
            PoolMetrics {
                active: 1,
                created: 1,
                reused: 0
            }
        );
        pool.put(enc);
        assert_eq!(pool.metrics().active, 0);
        assert_eq!(pool.idle_count(), 1);

        let enc = pool.get([2u8; 32]).unwrap();
        assert_eq!(enc.key(), &[2u8; 32]);
        assert_eq!(pool.metrics().reused, 1);
        assert_eq!(pool.metrics().created, 1);
        pool.put(enc);
    }

    #[test]
    fn test_put_resets_state() {
        let pool: EncryptorPool<Sm4System> = EncryptorPool::default();
        let mut enc = pool.get([7u8; 16]).unwrap().ctr().hex();
        enc.encrypt(b"payload").unwrap();
        assert_eq!(enc.iv_state(), IvState::Generated);
        pool.put(enc);

        let enc = pool.get([8u8; 16]).unwrap();
        assert_eq!(enc.mode(), Mode::Cbc);
        assert_eq!(enc.iv_state(), IvState::Unset);
        assert!(enc.iv().is_none());
    }

    #[test]
    fn test_idle_limit() {
        let config = CryptoConfig {
            pool: PoolConfig { max_idle: 1 },
            ..Default::default()
        };
        let pool: EncryptorPool<AesSystem> = EncryptorPool::new(config);
        let a = pool.get([1u8; 16]).unwrap();
        let b = pool.get([2u8; 16]).unwrap();
        pool.put(a);
        pool.put(b);
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.metrics().active, 0);
    }

    #[test]
    fn test_bad_key_keeps_idle_instance() {
        let pool: EncryptorPool<AesSystem> = EncryptorPool::default();
        let enc = pool.get([1u8; 16]).unwrap();
        pool.put(enc);

        assert!(pool.get([1u8; 5]).is_err());
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.metrics().active, 0);
    }

    #[test]
    fn test_pool_uses_config_defaults() {
        let mut config = CryptoConfig::default();
        config.symmetric.mode = Mode::Gcm;
        let pool: EncryptorPool<AesSystem> = EncryptorPool::new(config);
        let mut enc = pool.get([5u8; 16]).unwrap();
        assert_eq!(enc.mode(), Mode::Gcm);
        let ct = enc.encrypt(b"x").unwrap();
        assert_eq!(enc.decrypt(&ct).unwrap(), b"x");
        pool.put(enc);

        let enc = pool.get([6u8; 16]).unwrap();
        assert_eq!(enc.mode(), Mode::Gcm);
    }
}
