/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"db export"の実装
//!

use std::path::PathBuf;

use anyhow::Result;

use crate::cmd_args::{DbExportOpts, Options};
use crate::engine::Engine;
use super::common::{block_on, write_output};
use super::CommandContext;

///
/// "db export"サブコマンドのコンテキスト情報をパックした構造体
///
struct DbExportCommandContext {
    engine: Engine,
    output: Option<PathBuf>,
}

impl DbExportCommandContext {
    fn new(opts: &Options, sub_opts: &DbExportOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            output: sub_opts.output(),
        })
    }
}

// CommandContextトレイトの実装
impl CommandContext for DbExportCommandContext {
    fn exec(&self) -> Result<()> {
        let engine = self.engine.clone();
        let data = block_on(async move { engine.export().await })?;

        write_output(
            self.output.as_deref(),
            &serde_json::to_string_pretty(&data)?,
        )?;

        if let Some(path) = &self.output {
            eprintln!(
                "exported {} books and {} pages to {}",
                data.books.len(),
                data.pages.len(),
                path.display(),
            );
        }

        Ok(())
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &DbExportOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(DbExportCommandContext::new(opts, sub_opts)?))
}
