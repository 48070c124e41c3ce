/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"ingest"の実装
//!

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::cmd_args::{IngestOpts, Options};
use crate::engine::{Engine, IndexOptions, IndexOutcome};
use crate::indexer::DocumentKind;
use super::common::{read_input, with_ready_engine};
use super::CommandContext;

///
/// "ingest"サブコマンドのコンテキスト情報をパックした構造体
///
struct IngestCommandContext {
    engine: Engine,
    file_path: PathBuf,
    kind: DocumentKind,
    options: IndexOptions,
}

impl IngestCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options, sub_opts: &IngestOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            file_path: sub_opts.file_path(),
            kind: sub_opts.kind(),
            options: IndexOptions {
                force: sub_opts.is_force(),
                url: sub_opts.url(),
            },
        })
    }
}

// CommandContextトレイトの実装
impl CommandContext for IngestCommandContext {
    fn exec(&self) -> Result<()> {
        let payload: Value = serde_json::from_str(&read_input(&self.file_path)?)
            .map_err(|err| anyhow!("payload is not valid json: {}", err))?;

        let kind = self.kind;
        let options = self.options.clone();

        let outcome = with_ready_engine(&self.engine, |engine| async move {
            match kind {
                DocumentKind::Loose => {
                    engine.index_loose_with_fallback(payload, options).await
                }
                DocumentKind::Structured => {
                    engine.index_document(payload, kind, options).await
                }
            }
        })?;

        println!("{}", describe_outcome(&outcome));
        Ok(())
    }
}

///
/// インデックス処理結果の表示文字列の生成
///
fn describe_outcome(outcome: &IndexOutcome) -> String {
    match outcome {
        IndexOutcome::Indexed { key, removed, added } => {
            format!("indexed: {} (removed {}, added {})", key, removed, added)
        }
        IndexOutcome::Skipped { key } => {
            format!("skipped: {} (not expired)", key)
        }
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &IngestOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(IngestCommandContext::new(opts, sub_opts)?))
}
