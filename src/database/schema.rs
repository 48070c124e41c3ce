/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! データベースのスキーマ定義と共通定数を集約するモジュール
//!

use redb::{MultimapTableDefinition, TableDefinition};

use crate::database::types::{BookInfo, IndexDump, PageId, PageInfo};

/// ブック情報テーブル (ドキュメントキー => ブック情報)
pub(in crate::database) static BOOK_TABLE:
    TableDefinition<String, BookInfo> = TableDefinition::new("book_table");

/// ページ情報テーブル (ページID => ページ情報)
pub(in crate::database) static PAGE_TABLE:
    TableDefinition<PageId, PageInfo> = TableDefinition::new("page_table");

/// ドキュメントキー索引テーブル (ドキュメントキー => [ページID])
pub(in crate::database) static PAGE_KEY_TABLE:
    MultimapTableDefinition<String, PageId> =
    MultimapTableDefinition::new("page_key_table");

/// ページコード索引テーブル (ドキュメントキー,ページコード => ページID)
pub(in crate::database) static PAGE_CODE_TABLE:
    TableDefinition<(String, String), PageId> =
    TableDefinition::new("page_code_table");

/// インデックスダンプテーブル (レコードID => ダンプ)
pub(in crate::database) static INDEX_TABLE:
    TableDefinition<u64, IndexDump> = TableDefinition::new("index_table");

/// 連番管理テーブル (連番名 => 最終払い出し値)
pub(in crate::database) static SEQUENCE_TABLE:
    TableDefinition<String, u64> = TableDefinition::new("sequence_table");

/// インデックスダンプレコードのID
pub(in crate::database) const INDEX_RECORD_ID: u64 = 1;

/// ページIDの連番名
pub(in crate::database) const PAGE_ID_SEQUENCE: &str = "page_id";

///
/// データベース操作で使用するエラー種別
///
#[derive(Debug)]
pub enum DbError {
    /// ブックが存在しない
    BookNotFound,

    /// ページが存在しない
    PageNotFound,

    /// (ドキュメントキー, コード)が既存ページと競合した
    PageCodeConflict,
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::BookNotFound => write!(f, "book not found"),
            DbError::PageNotFound => write!(f, "page not found"),
            DbError::PageCodeConflict => {
                write!(f, "page code already exists for the document")
            }
        }
    }
}

impl std::error::Error for DbError {}
