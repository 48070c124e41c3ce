/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"fts suggest"の実装
//!

use anyhow::Result;

use crate::cmd_args::{FtsSuggestOpts, Options};
use crate::engine::Engine;
use super::common::with_ready_engine;
use super::CommandContext;

///
/// "fts suggest"サブコマンドのコンテキスト情報をパックした構造体
///
/// # 注記
/// 候補はブラウザのアドレスバー補完で扱う形式のJSON配列として出力する。
///
struct FtsSuggestCommandContext {
    engine: Engine,
    query: String,
}

impl FtsSuggestCommandContext {
    fn new(opts: &Options, sub_opts: &FtsSuggestOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            query: sub_opts.query(),
        })
    }
}

// CommandContextトレイトの実装
impl CommandContext for FtsSuggestCommandContext {
    fn exec(&self) -> Result<()> {
        let query = self.query.clone();
        let suggestions = with_ready_engine(&self.engine, |engine| async move {
            engine.suggestions(&query).await
        })?;

        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        Ok(())
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &FtsSuggestOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(FtsSuggestCommandContext::new(opts, sub_opts)?))
}
