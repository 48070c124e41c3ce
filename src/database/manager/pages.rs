/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ページ情報の参照系操作を提供するモジュール
//!

use anyhow::Result;
use redb::{ReadableDatabase, ReadableMultimapTable, ReadableTable};

use crate::database::schema::{PAGE_KEY_TABLE, PAGE_TABLE};
use crate::database::txn_helpers::{
    collect_page_ids, collect_page_window, collect_pages,
};
use crate::database::types::{PageId, PageInfo};
use super::DatabaseManager;

impl DatabaseManager {
    ///
    /// ページIDからページ情報を取得
    ///
    /// # 引数
    /// * `id` - ページID
    ///
    /// # 戻り値
    /// 取得に成功した場合は`Ok(Some(PageInfo))`を返す。
    /// 存在しない場合は`Ok(None)`を返す。
    ///
    pub fn get_page_by_id(&self, id: PageId) -> Result<Option<PageInfo>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PAGE_TABLE)?;
        Ok(table.get(id)?.map(|entry| entry.value()))
    }

    ///
    /// 複数のページIDからページ情報をまとめて取得
    ///
    /// # 引数
    /// * `ids` - ページIDの一覧
    ///
    /// # 戻り値
    /// `ids`の順に並べたページ情報の一覧を返す。存在しないIDは読み飛ばす。
    ///
    /// # 注記
    /// 1回の読み込みトランザクションで全件を取得する。
    ///
    pub fn get_pages_by_ids(&self, ids: &[PageId]) -> Result<Vec<PageInfo>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PAGE_TABLE)?;
        collect_pages(&table, ids)
    }

    ///
    /// 全ページ情報の取得
    ///
    /// # 戻り値
    /// ページID順に並べたページ情報の一覧を返す。
    ///
    pub fn get_all_pages(&self) -> Result<Vec<PageInfo>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PAGE_TABLE)?;

        let mut pages = Vec::new();
        for entry in table.iter()? {
            let (_, page) = entry?;
            pages.push(page.value());
        }

        Ok(pages)
    }

    ///
    /// ドキュメントキーに属するページ情報の取得
    ///
    /// # 引数
    /// * `key` - ドキュメントキー
    ///
    /// # 戻り値
    /// ページID順に並べたページ情報の一覧を返す。
    ///
    pub fn get_pages_by_key(&self, key: &str) -> Result<Vec<PageInfo>> {
        let txn = self.db.begin_read()?;
        let key_table = txn.open_multimap_table(PAGE_KEY_TABLE)?;
        let page_table = txn.open_table(PAGE_TABLE)?;

        let ids = collect_page_ids(&key_table, key)?;
        collect_pages(&page_table, &ids)
    }

    ///
    /// ドキュメントキーに属するページ数の取得
    ///
    pub fn count_pages_by_key(&self, key: &str) -> Result<u64> {
        let txn = self.db.begin_read()?;
        let key_table = txn.open_multimap_table(PAGE_KEY_TABLE)?;
        Ok(key_table.get(key.to_string())?.len())
    }

    ///
    /// ドキュメントキーに属するページ情報の部分取得
    ///
    /// # 引数
    /// * `key` - ドキュメントキー
    /// * `skip` - 読み飛ばす件数
    /// * `limit` - 取り出す最大件数
    /// * `step` - 読み飛ばし時に一度に進めるカーソルの最大件数
    ///
    /// # 戻り値
    /// ページID順で`skip`件目から最大`limit`件のページ情報を返す。
    ///
    pub fn get_pages_by_key_window(
        &self,
        key: &str,
        skip: usize,
        limit: usize,
        step: usize,
    ) -> Result<Vec<PageInfo>> {
        let txn = self.db.begin_read()?;
        let key_table = txn.open_multimap_table(PAGE_KEY_TABLE)?;
        let page_table = txn.open_table(PAGE_TABLE)?;

        collect_page_window(&key_table, &page_table, key, skip, limit, step)
    }
}
