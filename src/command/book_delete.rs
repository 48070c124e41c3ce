/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"book delete"の実装
//!

use anyhow::{anyhow, Result};

use crate::cmd_args::{BookDeleteOpts, Options};
use crate::engine::Engine;
use super::common::with_ready_engine;
use super::CommandContext;

///
/// "book delete"サブコマンドのコンテキスト情報をパックした構造体
///
struct BookDeleteCommandContext {
    engine: Engine,
    key: String,
}

impl BookDeleteCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options, sub_opts: &BookDeleteOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            key: sub_opts.key(),
        })
    }
}

// CommandContextトレイトの実装
impl CommandContext for BookDeleteCommandContext {
    fn exec(&self) -> Result<()> {
        let key = self.key.clone();
        let deleted = with_ready_engine(&self.engine, |engine| async move {
            engine.delete_book(&key).await
        })?;

        match deleted {
            Some(count) => {
                println!("deleted: {} ({} pages)", self.key, count);
                Ok(())
            }
            None => Err(anyhow!("book not found: {}", self.key)),
        }
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &BookDeleteOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(BookDeleteCommandContext::new(opts, sub_opts)?))
}
