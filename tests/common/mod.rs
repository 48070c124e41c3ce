/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 結合テスト用の共通ヘルパー
//!

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

/// テスト用ブックのURL
pub const BOOK_URL: &str =
    "https://uuapp.plus4u.net/uu-bookkit-maing01/abc123-guide01/book/page?code=home";

/// テスト用ブックのドキュメントキー
pub const BOOK_KEY: &str = "guide01";

///
/// テスト用の実行環境
///
pub struct TestEnv {
    /// ベースディレクトリ
    pub base: PathBuf,

    /// データベースファイルのパス
    pub db_path: PathBuf,
}

impl TestEnv {
    ///
    /// テスト用ディレクトリを準備する
    ///
    pub fn new() -> Self {
        let base = Path::new("tests").join("tmp").join(unique_suffix());
        let db_dir = base.join("db");

        fs::create_dir_all(&db_dir).expect("create db dir failed");

        Self {
            db_path: db_dir.join("database.redb"),
            base,
        }
    }

    ///
    /// JSONをファイルに書き出す
    ///
    /// # 戻り値
    /// 書き出したファイルのパス
    ///
    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.base.join(name);
        fs::write(&path, serde_json::to_string_pretty(value).expect("json"))
            .expect("write json failed");
        path
    }

    ///
    /// CLIを実行する
    ///
    /// # 引数
    /// * `args` - サブコマンド以降の引数
    ///
    /// # 戻り値
    /// プロセスの実行結果
    ///
    pub fn run<I, S>(&self, args: I) -> Output
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.run_with_stdin(args, "")
    }

    ///
    /// 標準入力を与えてCLIを実行する
    ///
    pub fn run_with_stdin<I, S>(&self, args: I, stdin: &str) -> Output
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut child = Command::new(test_binary_path())
            .env("XDG_CONFIG_HOME", &self.base)
            .env("XDG_DATA_HOME", &self.base)
            .arg("--log-level")
            .arg("none")
            .arg("--db-path")
            .arg(&self.db_path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn docseek failed");

        {
            let mut input = child.stdin.take().expect("stdin missing");
            input.write_all(stdin.as_bytes()).expect("write stdin failed");
        }

        child.wait_with_output().expect("wait docseek failed")
    }

    ///
    /// 成功を期待してCLIを実行し、標準出力を返す
    ///
    pub fn run_ok<I, S>(&self, args: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        String::from_utf8(output.stdout).expect("stdout is not utf8")
    }

    ///
    /// 失敗を期待してCLIを実行し、標準エラー出力を返す
    ///
    pub fn run_fail<I, S>(&self, args: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = self.run(args);
        assert!(!output.status.success(), "command unexpectedly succeeded");

        String::from_utf8(output.stderr).expect("stderr is not utf8")
    }
}

// Dropトレイトの実装
impl Drop for TestEnv {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.base);
    }
}

///
/// 一意なサフィックス文字列を生成する
///
/// # 戻り値
/// サフィックス文字列
///
pub fn unique_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let pid = std::process::id();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time failed")
        .as_nanos();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", pid, now, seq)
}

///
/// メニュー(コード, ラベル, インデント)からブック形式のペイロードを生成
///
pub fn structured_payload(menu: &[(&str, &str, i64)]) -> Value {
    let menu: Vec<Value> = menu.iter()
        .map(|(code, label, indent)| {
            json!({"page": code, "label": {"en": label}, "indent": indent})
        })
        .collect();

    json!({
        "url": BOOK_URL,
        "loadBook": {
            "name": {"en": "Operations Guide"},
            "primaryLanguage": "en",
            "menu": menu,
            "theme": {"main": "#336699"}
        },
        "getBookStructure": {
            "itemMap": {}
        }
    })
}

///
/// 3ページ構成の標準的なブック形式ペイロード
///
pub fn guide_payload() -> Value {
    structured_payload(&[
        ("home", "Home", 0),
        ("install", "Installation", 1),
        ("upgrade", "Upgrade Notes", 2),
    ])
}

///
/// テーブル出力からデータ行の先頭列を取り出す
///
/// # 注記
/// 先頭行はヘッダとして読み飛ばし、空行以降は無視する。
///
pub fn first_column(table: &str) -> Vec<String> {
    table.lines()
        .skip(1)
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

///
/// テスト対象のバイナリパスを返す
///
pub fn test_binary_path() -> PathBuf {
    if let Some(exe) = std::env::var_os("CARGO_BIN_EXE_docseek") {
        return PathBuf::from(exe);
    }

    let mut path = std::env::current_exe().expect("current exe missing");
    path.pop(); // deps
    path.pop(); // debug
    path.push("docseek");
    if cfg!(windows) {
        path.set_extension("exe");
    }

    if !path.exists() {
        panic!("docseek binary not found: {}", path.display());
    }

    path
}

///
/// パスをコマンド引数用の文字列に変換する
///
pub fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
