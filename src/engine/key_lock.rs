/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ドキュメントキー単位の排他制御を提供するモジュール
//!

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// キー毎の非同期ロック
type KeyMutex = Arc<AsyncMutex<()>>;

///
/// ドキュメントキー単位のロック表
///
/// # 注記
/// 同じキーに対する操作は到着順に直列化され、異なるキーに対する操作は並行
/// して実行できる。誰も保持していないエントリはロック取得時に刈り取る。
///
#[derive(Clone, Default)]
pub(crate) struct KeyLocks {
    entries: Arc<Mutex<HashMap<String, KeyMutex>>>,
}

impl KeyLocks {
    ///
    /// キーに対するロックの取得
    ///
    /// # 引数
    /// * `key` - ドキュメントキー
    ///
    /// # 戻り値
    /// ロックガードを`Ok()`でラップして返す。ガードを破棄するとロックが解放
    /// される。
    ///
    pub(crate) async fn lock(&self, key: &str) -> Result<OwnedMutexGuard<()>> {
        let entry = {
            let mut entries = self.entries.lock()
                .map_err(|_| anyhow!("key lock table is poisoned"))?;

            entries.retain(|_, entry| Arc::strong_count(entry) > 1);
            entries.entry(key.to_string()).or_default().clone()
        };

        Ok(entry.lock_owned().await)
    }

    ///
    /// 保持中または待機中のキー数
    ///
    pub(crate) fn active_keys(&self) -> usize {
        match self.entries.lock() {
            Ok(entries) => {
                entries.values()
                    .filter(|entry| Arc::strong_count(entry) > 1)
                    .count()
            }
            Err(_) => 0,
        }
    }
}
