/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! インデックスダンプの保存・読み出しを提供するモジュール
//!

use anyhow::Result;
use redb::{ReadableDatabase, ReadableTable};

use crate::database::schema::{INDEX_RECORD_ID, INDEX_TABLE};
use super::DatabaseManager;

impl DatabaseManager {
    ///
    /// インデックスダンプの取得
    ///
    /// # 戻り値
    /// ダンプが保存されている場合は`Ok(Some(String))`を返す。
    /// 未保存の場合は`Ok(None)`を返す。
    ///
    pub fn get_index_dump(&self) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(INDEX_TABLE)?;
        Ok(table.get(INDEX_RECORD_ID)?.map(|entry| entry.value().into_dump()))
    }

    ///
    /// インデックスダンプの保存
    ///
    /// # 注記
    /// 既存のダンプは置き換えられる。
    ///
    pub fn put_index_dump(&self, dump: String) -> Result<()> {
        self.write(|writer| writer.put_index_dump(dump))
    }
}
