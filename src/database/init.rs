/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! データベース初期化処理を提供するモジュール
//!

use anyhow::{Context, Result};
use redb::Database;

use super::schema::{
    BOOK_TABLE, INDEX_TABLE, PAGE_CODE_TABLE, PAGE_KEY_TABLE, PAGE_TABLE,
    SEQUENCE_TABLE,
};

///
/// データベースのイニシャライズ
///
/// # 引数
/// * `db` - 初期化対象のデータベース
///
/// # 戻り値
/// 初期化に成功した場合は`Ok(())`を返す。失敗した場合はエラー情報を`Err()`でラ
/// ップして返す。
///
/// # 注記
/// 本関数では初期化処理として以下のテーブルの作成を試みる。
///
///  - BOOK_TABLE: ブック情報テーブル
///  - PAGE_TABLE: ページ情報テーブル
///  - PAGE_KEY_TABLE: ドキュメントキー索引テーブル
///  - PAGE_CODE_TABLE: ページコード索引テーブル
///  - INDEX_TABLE: インデックスダンプテーブル
///  - SEQUENCE_TABLE: 連番管理テーブル
///
pub(in crate::database) fn init_database(db: &mut Database) -> Result<()> {
    /*
     * 書き込みトランザクション開始
     */
    let txn = db.begin_write()?;

    /*
     * 各種テーブル作成
     */
    {
        /*
         * ブック・ページ関連テーブル作成
         */
        // ブック情報テーブル
        let _ = txn.open_table(BOOK_TABLE)
            .context("create BOOK_TABLE")?;

        // ページ情報テーブル
        let _ = txn.open_table(PAGE_TABLE)
            .context("create PAGE_TABLE")?;

        // ドキュメントキー索引テーブル
        let _ = txn.open_multimap_table(PAGE_KEY_TABLE)
            .context("create PAGE_KEY_TABLE")?;

        // ページコード索引テーブル
        let _ = txn.open_table(PAGE_CODE_TABLE)
            .context("create PAGE_CODE_TABLE")?;

        /*
         * 管理用テーブル作成
         */
        // インデックスダンプテーブル
        let _ = txn.open_table(INDEX_TABLE)
            .context("create INDEX_TABLE")?;

        // 連番管理テーブル
        let _ = txn.open_table(SEQUENCE_TABLE)
            .context("create SEQUENCE_TABLE")?;
    }

    /*
     * コミット
     */
    txn.commit()?;

    Ok(())
}
