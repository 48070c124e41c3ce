/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド共通処理を提供するモジュール
//!

use std::fmt::Write as _;
use std::future::Future;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tokio::runtime::Builder;

use crate::cmd_args::is_stdio_path;
use crate::engine::Engine;

///
/// 非同期処理の実行
///
/// # 概要
/// マルチスレッドランタイムを生成し、渡された処理を完了まで実行する。
///
/// # 引数
/// * `future` - 実行する非同期処理
///
/// # 戻り値
/// 非同期処理の結果を返す。
///
pub(crate) fn block_on<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let rt = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| anyhow!("tokio runtime failed: {}", err))?;

    rt.block_on(future)
}

///
/// 検索インデックスを初期化した上での非同期処理の実行
///
/// # 引数
/// * `engine` - 対象のエンジン
/// * `func` - インデックス初期化後に実行する処理
///
/// # 戻り値
/// 処理の結果を返す。
///
pub(crate) fn with_ready_engine<F, Fut, T>(engine: &Engine, func: F)
    -> Result<T>
where
    F: FnOnce(Engine) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let engine = engine.clone();

    block_on(async move {
        engine.initialize_index()
            .await
            .context("search index initialize")?;

        func(engine).await
    })
}

///
/// 入力データの読み込み
///
/// # 引数
/// * `path` - 読み込むファイルのパス("-"の場合は標準入力)
///
/// # 戻り値
/// 読み込んだ文字列を返す。
///
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if is_stdio_path(path) {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))
    }
}

///
/// 出力データの書き込み
///
/// # 引数
/// * `path` - 書き込み先のパス(`None`の場合は標準出力)
/// * `data` - 書き込む文字列
///
pub(crate) fn write_output(path: Option<&Path>, data: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            std::fs::write(path, data)
                .with_context(|| format!("write {}", path.display()))
        }

        None => {
            let stdout = io::stdout();
            let mut output = stdout.lock();
            writeln!(output, "{}", data)?;
            Ok(())
        }
    }
}

///
/// 標準入出力を使った確認の問い合わせ
///
/// # 引数
/// * `prompt` - 表示する問い合わせ文
///
/// # 戻り値
/// 肯定の回答があった場合は`true`を返す。
///
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();

    let mut input = stdin.lock();
    let mut output = stdout.lock();

    confirm_with_io(prompt, &mut input, &mut output)
}

///
/// 任意の入出力を使った確認の問い合わせ
///
/// # 引数
/// * `prompt` - 表示する問い合わせ文
/// * `input` - 入力ストリーム（質問への回答を受け取る）
/// * `output` - 出力ストリーム（質問を表示する）
///
/// # 戻り値
/// "y"または"yes"が入力された場合は`true`、それ以外は`false`を返す。
///
fn confirm_with_io<R, W>(prompt: &str, input: &mut R, output: &mut W)
    -> Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{} [y/N]: ", prompt)?;
    output.flush()?;

    let mut buf = String::new();
    input.read_line(&mut buf)?;

    let ans = buf.trim().to_lowercase();
    Ok(ans == "y" || ans == "yes")
}

///
/// テーブル形式の文字列生成
///
/// # 引数
/// * `lines` - 先頭をヘッダとする行データ
///
/// # 戻り値
/// 列幅を揃えた文字列を返す。
///
/// # 注記
/// 列幅は文字数で計算する。最終列は桁揃えの空白を付与しない。
///
pub(crate) fn format_table(lines: &[Vec<String>]) -> String {
    let Some(header) = lines.first() else {
        return String::new();
    };

    /*
     * 列幅の計算
     */
    let mut widths = vec![0usize; header.len()];
    for row in lines {
        for (idx, value) in row.iter().enumerate() {
            if idx < widths.len() {
                widths[idx] = widths[idx].max(value.chars().count());
            }
        }
    }

    /*
     * 出力文字列の生成
     */
    let mut output = String::new();
    for (row_index, row) in lines.iter().enumerate() {
        let mut line = String::new();
        for (idx, value) in row.iter().enumerate() {
            if idx + 1 == row.len() {
                line.push_str(value);
            } else {
                let _ = write!(
                    &mut line,
                    "{:width$}  ",
                    value,
                    width = widths.get(idx).copied().unwrap_or(0)
                );
            }
        }

        output.push_str(&line);
        if row_index + 1 < lines.len() {
            output.push('\n');
        }
    }

    output
}

///
/// ヘッダ行の生成
///
pub(crate) fn header_row(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn confirm_accepts_yes() {
        let mut input = Cursor::new("Yes\n");
        let mut output = Vec::new();

        let ans = confirm_with_io("clear?", &mut input, &mut output)
            .expect("confirm failed");
        assert!(ans);

        let prompt = String::from_utf8(output).expect("utf8");
        assert_eq!(prompt, "clear? [y/N]: ");
    }

    #[test]
    fn confirm_rejects_other_answers() {
        for answer in ["\n", "n\n", "no\n", "yy\n", ""] {
            let mut input = Cursor::new(answer);
            let mut output = Vec::new();

            let ans = confirm_with_io("clear?", &mut input, &mut output)
                .expect("confirm failed");
            assert!(!ans, "answer {:?} must be rejected", answer);
        }
    }

    #[test]
    fn table_columns_are_aligned() {
        let lines = vec![
            header_row(&["ID", "NAME"]),
            vec!["1".to_string(), "Intro".to_string()],
            vec!["120".to_string(), "Setup".to_string()],
        ];

        let output = format_table(&lines);
        let rows: Vec<&str> = output.lines().collect();
        assert_eq!(rows, vec!["ID   NAME", "1    Intro", "120  Setup"]);
    }

    #[test]
    fn table_width_counts_characters() {
        let lines = vec![
            header_row(&["NAME", "KEY"]),
            vec!["導入".to_string(), "k1".to_string()],
        ];

        let output = format_table(&lines);
        let rows: Vec<&str> = output.lines().collect();
        assert_eq!(rows[0], "NAME  KEY");
        assert_eq!(rows[1], "導入    k1");
    }

    #[test]
    fn empty_table_is_empty_string() {
        assert_eq!(format_table(&[]), "");
    }

    #[test]
    fn write_output_creates_parent_directory() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("out/export.json");

        write_output(Some(&path), "{}").expect("write failed");
        assert_eq!(read_input(&path).expect("read failed"), "{}");
    }
}
