/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"fts rebuild"の実装
//!

use anyhow::Result;

use crate::cmd_args::Options;
use crate::engine::Engine;
use super::common::block_on;
use super::CommandContext;

///
/// "fts rebuild"コマンド実行コンテキスト
///
struct FtsRebuildCommandContext {
    engine: Engine,
}

impl FtsRebuildCommandContext {
    ///
    /// コンテキストの生成
    ///
    /// # 引数
    /// * `opts` - コマンドラインオプション
    ///
    /// # 戻り値
    /// 生成したコンテキスト
    ///
    fn new(opts: &Options) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
        })
    }
}

impl CommandContext for FtsRebuildCommandContext {
    ///
    /// コマンドの実行
    ///
    /// # 概要
    /// 格納済みの全ページからインデックスを再構築し、保存する。保存済みのイ
    /// ンデックスが壊れていても実行できるよう、事前の初期化は行わない。
    ///
    /// # 戻り値
    /// 処理に成功した場合は`Ok(())`
    ///
    fn exec(&self) -> Result<()> {
        let engine = self.engine.clone();
        let count = block_on(async move { engine.rebuild_index().await })?;

        println!("indexed: {}", count);
        Ok(())
    }
}

///
/// コマンドコンテキストの生成
///
/// # 引数
/// * `opts` - コマンドラインオプション
///
/// # 戻り値
/// 生成したコマンドコンテキスト
///
pub(crate) fn build_context(
    opts: &Options,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(FtsRebuildCommandContext::new(opts)?))
}
