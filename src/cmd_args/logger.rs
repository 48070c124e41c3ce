/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ログ機能の初期化を行うモジュール
//!

use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use flexi_logger::{
    detailed_format, Age, Cleanup, Criterion, Duplicate, FileSpec, Logger,
    LoggerHandle, Naming,
};

use super::{LogLevel, Options};

/// 保持しておくログファイルの世代数
const KEEP_LOG_FILES: usize = 7;

/// ロガーのハンドル(プロセス終了まで保持する)
static LOGGER_HANDLE: OnceLock<LoggerHandle> = OnceLock::new();

///
/// ログ機能の初期化
///
/// # 引数
/// * `opts` - コンフィギュレーション適用後のオプション情報
///
/// # 戻り値
/// 初期化に成功した場合は`Ok(())`を返す。
///
/// # 注記
/// ログレベルに`NONE`が指定されている場合はロガーを起動しない。ログファイル
/// は日単位でローテーションする。
///
pub(super) fn init(opts: &Options) -> Result<()> {
    let level = opts.log_level();
    if level == LogLevel::None {
        return Ok(());
    }

    let dir = opts.log_output();
    std::fs::create_dir_all(&dir)?;

    let duplicate = if opts.log_tee() {
        Duplicate::All
    } else {
        Duplicate::None
    };

    let handle = Logger::try_with_str(level.as_ref())?
        .log_to_file(
            FileSpec::default()
                .directory(&dir)
                .basename(env!("CARGO_PKG_NAME"))
        )
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .duplicate_to_stderr(duplicate)
        .format(detailed_format)
        .start()
        .map_err(|err| anyhow!("logger start failed: {}", err))?;

    if LOGGER_HANDLE.set(handle).is_err() {
        return Err(anyhow!("logger is already initialized"));
    }

    Ok(())
}
