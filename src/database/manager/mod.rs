/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! データベース操作のマネージャを提供するモジュール
//!

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use redb::{Database, WriteTransaction};

use crate::database::txn_helpers::{
    clear_records_in_txn, delete_book_in_txn, delete_page_in_txn,
    delete_pages_by_key_in_txn, get_book_in_txn, has_pages_in_txn,
    insert_page_in_txn, list_pages_by_key_in_txn, put_book_in_txn,
    put_index_dump_in_txn,
};
use crate::database::types::{BookInfo, PageId, PageInfo};
use super::init::init_database;

pub(crate) mod books;
pub(crate) mod index_dump;
pub(crate) mod pages;

///
/// データベース操作手順を集約する構造体
///
pub struct DatabaseManager {
    /// データベースオブジェクト
    db: Database,
}

impl DatabaseManager {
    ///
    /// データベースマネージャのオープン
    ///
    /// # 引数
    /// * `db_path` - データベースファイルへのパス
    ///
    /// # 戻り値
    /// データベースのオープンに成功した場合はマネージャオブジェクトを`Ok()`で
    /// ラップして返す。失敗した場合はエラー情報を `Err()`でラップして返す。
    ///
    /// # 注記
    /// 親ディレクトリが存在しない場合は作成する。
    ///
    pub fn open<P>(db_path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let db_path = db_path.as_ref();

        if let Some(dir) = db_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("create {}", dir.display()))?;
            }
        }

        let db = match Database::create(db_path) {
            Ok(mut db) => {
                init_database(&mut db)?;
                db
            }

            Err(err) => return Err(err.into()),
        };

        Ok(Self { db })
    }

    ///
    /// 書き込み単位の実行
    ///
    /// # 引数
    /// * `func` - 書き込みトランザクション上で実行する処理
    ///
    /// # 戻り値
    /// `func`が成功した場合はコミットした上でその戻り値を返す。`func`が失敗し
    /// た場合はトランザクションを破棄してエラーを返す。
    ///
    /// # 注記
    /// `func`内で行った変更は全て反映されるか、全て破棄されるかのいずれかとな
    /// る。
    ///
    pub fn write<F, T>(&self, func: F) -> Result<T>
    where
        F: FnOnce(&StoreWriter<'_>) -> Result<T>,
    {
        let txn = self.db.begin_write()?;

        let result = {
            let writer = StoreWriter { txn: &txn };
            func(&writer)
        };

        match result {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }

            Err(err) => {
                txn.abort()?;
                Err(err)
            }
        }
    }
}

///
/// 書き込みトランザクション上の操作を提供する構造体
///
/// # 注記
/// [`DatabaseManager::write`]の中でのみ生成される。
///
pub struct StoreWriter<'a> {
    txn: &'a WriteTransaction,
}

impl StoreWriter<'_> {
    ///
    /// ブック情報の取得
    ///
    /// # 引数
    /// * `key` - ドキュメントキー
    ///
    /// # 戻り値
    /// ブックが存在する場合は`Ok(Some(BookInfo))`を返す。
    ///
    pub fn get_book(&self, key: &str) -> Result<Option<BookInfo>> {
        get_book_in_txn(self.txn, key)
    }

    ///
    /// ブック情報の登録(上書き)
    ///
    pub fn put_book(&self, book: &BookInfo) -> Result<()> {
        put_book_in_txn(self.txn, book)
    }

    ///
    /// ブック情報の削除
    ///
    /// # 戻り値
    /// 削除したブック情報を返す。
    ///
    pub fn delete_book(&self, key: &str) -> Result<Option<BookInfo>> {
        delete_book_in_txn(self.txn, key)
    }

    ///
    /// ドキュメントキーに属するページ情報の取得
    ///
    pub fn get_pages_by_key(&self, key: &str) -> Result<Vec<PageInfo>> {
        list_pages_by_key_in_txn(self.txn, key)
    }

    ///
    /// ページ情報の登録
    ///
    /// # 引数
    /// * `page` - 登録するページ情報
    ///
    /// # 戻り値
    /// ID割り当て済みのページ情報を返す。
    ///
    /// # 注記
    /// (ドキュメントキー, コード)が既存ページと競合する場合は
    /// `DbError::PageCodeConflict`でエラーとなる。
    ///
    pub fn add_page(&self, page: PageInfo) -> Result<PageInfo> {
        insert_page_in_txn(self.txn, page)
    }

    ///
    /// ページ情報の削除
    ///
    /// # 戻り値
    /// 削除したページ情報を返す。
    ///
    pub fn delete_page(&self, id: PageId) -> Result<Option<PageInfo>> {
        delete_page_in_txn(self.txn, id)
    }

    ///
    /// ドキュメントキーに属する全ページの削除
    ///
    pub fn delete_pages_by_key(&self, key: &str) -> Result<Vec<PageInfo>> {
        delete_pages_by_key_in_txn(self.txn, key)
    }

    ///
    /// ドキュメントキーに属するページの有無
    ///
    pub fn has_pages(&self, key: &str) -> Result<bool> {
        has_pages_in_txn(self.txn, key)
    }

    ///
    /// インデックスダンプの保存
    ///
    pub fn put_index_dump(&self, dump: String) -> Result<()> {
        put_index_dump_in_txn(self.txn, dump)
    }

    ///
    /// 全ブック・全ページの削除
    ///
    pub fn clear_records(&self) -> Result<()> {
        clear_records_in_txn(self.txn)
    }
}
