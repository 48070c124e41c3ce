/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"db clear"の実装
//!

use anyhow::Result;

use crate::cmd_args::{DbClearOpts, Options};
use crate::engine::Engine;
use super::common::{block_on, confirm};
use super::CommandContext;

///
/// "db clear"サブコマンドのコンテキスト情報をパックした構造体
///
struct DbClearCommandContext {
    engine: Engine,
    confirmed: bool,
}

impl DbClearCommandContext {
    fn new(opts: &Options, sub_opts: &DbClearOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            confirmed: sub_opts.is_confirmed(),
        })
    }
}

// CommandContextトレイトの実装
impl CommandContext for DbClearCommandContext {
    fn exec(&self) -> Result<()> {
        if !self.confirmed && !confirm("全てのブックとページを削除しますか？")? {
            println!("canceled");
            return Ok(());
        }

        let engine = self.engine.clone();
        block_on(async move { engine.clear_all().await })?;

        println!("cleared");
        Ok(())
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &DbClearOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(DbClearCommandContext::new(opts, sub_opts)?))
}
