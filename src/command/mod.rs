/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンドの処理を提供するモジュール
//!

pub(crate) mod common;
pub(crate) mod book_delete;
pub(crate) mod book_list;
pub(crate) mod commands;
pub(crate) mod db_clear;
pub(crate) mod db_export;
pub(crate) mod db_import;
pub(crate) mod fts_rebuild;
pub(crate) mod fts_search;
pub(crate) mod fts_suggest;
pub(crate) mod help_all;
pub(crate) mod ingest;
pub(crate) mod page_delete;
pub(crate) mod page_list;

use anyhow::Result;

///
/// コマンドコンテキスト集約するトレイト
///
pub(crate) trait CommandContext {
    ///
    /// サブコマンドの実行
    ///
    fn exec(&self) -> Result<()>;
}
