/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"page delete"の実装
//!

use anyhow::{anyhow, Result};

use crate::cmd_args::{Options, PageDeleteOpts};
use crate::database::types::PageId;
use crate::engine::Engine;
use super::common::with_ready_engine;
use super::CommandContext;

///
/// "page delete"サブコマンドのコンテキスト情報をパックした構造体
///
struct PageDeleteCommandContext {
    engine: Engine,
    id: PageId,
}

impl PageDeleteCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options, sub_opts: &PageDeleteOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            id: sub_opts.id(),
        })
    }
}

// CommandContextトレイトの実装
impl CommandContext for PageDeleteCommandContext {
    fn exec(&self) -> Result<()> {
        let id = self.id;
        let deleted = with_ready_engine(&self.engine, |engine| async move {
            engine.delete_page(id).await
        })?;

        match deleted {
            Some(page) => {
                println!(
                    "deleted: {} {}/{}",
                    id,
                    page.document_key(),
                    page.code()
                );
                Ok(())
            }
            None => Err(anyhow!("page not found: {}", id)),
        }
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &PageDeleteOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(PageDeleteCommandContext::new(opts, sub_opts)?))
}
