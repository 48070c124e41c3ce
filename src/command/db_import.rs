/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"db import"の実装
//!

use std::path::PathBuf;

use anyhow::Result;

use crate::cmd_args::{DbImportOpts, Options};
use crate::engine::{Engine, ImportSummary};
use super::common::{block_on, read_input};
use super::CommandContext;

///
/// "db import"サブコマンドのコンテキスト情報をパックした構造体
///
struct DbImportCommandContext {
    engine: Engine,
    file_path: PathBuf,
}

impl DbImportCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options, sub_opts: &DbImportOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            file_path: sub_opts.file_path(),
        })
    }
}

// CommandContextトレイトの実装
impl CommandContext for DbImportCommandContext {
    ///
    /// コマンドの実行
    ///
    /// # 注記
    /// 取り込み後にインデックスを再構築するため、事前のインデックス初期化は
    /// 行わない。
    ///
    fn exec(&self) -> Result<()> {
        let json = read_input(&self.file_path)?;
        let engine = self.engine.clone();
        let summary = block_on(async move { engine.import(&json).await })?;

        println!("{}", describe_summary(&summary));
        Ok(())
    }
}

///
/// 取り込み結果の表示文字列の生成
///
fn describe_summary(summary: &ImportSummary) -> String {
    format!(
        "imported: {} books, {} pages{}",
        summary.books_added,
        summary.pages_added,
        if summary.was_empty_database { " (into empty database)" } else { "" },
    )
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &DbImportOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(DbImportCommandContext::new(opts, sub_opts)?))
}
