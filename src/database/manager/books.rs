/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ブック情報の操作を提供するモジュール
//!

use anyhow::Result;
use redb::{ReadableDatabase, ReadableTable};

use crate::database::schema::BOOK_TABLE;
use crate::database::types::BookInfo;
use super::DatabaseManager;

impl DatabaseManager {
    ///
    /// ブック情報の取得
    ///
    /// # 引数
    /// * `key` - ドキュメントキー
    ///
    /// # 戻り値
    /// 取得に成功した場合は`Ok(Some(BookInfo))`を返す。
    /// 存在しない場合は`Ok(None)`を返す。
    ///
    pub fn get_book_by_key(&self, key: &str) -> Result<Option<BookInfo>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(BOOK_TABLE)?;
        Ok(table.get(key.to_string())?.map(|entry| entry.value()))
    }

    ///
    /// 全ブック情報の取得
    ///
    /// # 戻り値
    /// ドキュメントキー順に並べたブック情報の一覧を返す。
    ///
    pub fn get_all_books(&self) -> Result<Vec<BookInfo>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(BOOK_TABLE)?;

        let mut books = Vec::new();
        for entry in table.iter()? {
            let (_, book) = entry?;
            books.push(book.value());
        }

        Ok(books)
    }
}
