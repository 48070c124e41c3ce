/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

mod common;

use serde_json::Value;

use common::*;

///
/// 標準的なブックを取り込んだ環境を準備する
///
fn prepare_indexed_env() -> TestEnv {
    let env = TestEnv::new();
    let payload = env.write_json("guide.json", &guide_payload());
    env.run_ok(["ingest", path_arg(&payload).as_str()]);
    env
}

#[test]
///
/// fts search がページURL付きの結果を表示することを確認する。
fn fts_search_cli_shows_ranked_pages() {
    let env = prepare_indexed_env();

    let output = env.run_ok(["fts", "search", "installation"]);
    let mut lines = output.lines();
    let header = lines.next().expect("header missing");
    assert!(header.starts_with("SCORE"));
    assert!(header.contains("URL"));

    let row = lines.next().expect("row missing");
    assert!(row.contains("Installation"));
    assert!(row.ends_with(
        "https://uuapp.plus4u.net/uu-bookkit-maing01/guide01/book/page?code=install"
    ));

    let output = env.run_ok(["fts", "search", "nonexistentterm"]);
    assert_eq!(output.trim(), "no pages found");
}

#[test]
///
/// --page-url-base でページURLのベースを差し替えられることを確認する。
fn fts_search_cli_uses_page_url_base() {
    let env = prepare_indexed_env();

    let output = env.run_ok([
        "--page-url-base",
        "https://books.example.com/kit/",
        "fts",
        "search",
        "upgrade",
    ]);
    assert!(output.contains(
        "https://books.example.com/kit/guide01/book/page?code=upgrade"
    ));
}

#[test]
///
/// ブック指定で絞り込んだ検索が位置情報を表示することを確認する。
fn fts_search_cli_filters_by_book() {
    let env = prepare_indexed_env();

    let output = env.run_ok(["fts", "search", "-b", "guide01", "notes"]);
    assert!(output.contains("Upgrade Notes"));
    assert!(output.contains("page 1/1"));

    let output = env.run_ok(["fts", "search", "-b", "other99", "notes"]);
    assert_eq!(output.trim(), "no pages found");
}

#[test]
///
/// fts suggest がエスケープ済みの説明を持つJSON配列を出力することを確認す
/// る。
fn fts_suggest_cli_outputs_json() {
    let env = prepare_indexed_env();

    let output = env.run_ok(["fts", "suggest", "installation"]);
    let value: Value = serde_json::from_str(&output).expect("invalid json");
    let items = value.as_array().expect("array expected");
    assert_eq!(items.len(), 1);

    assert_eq!(
        items[0]["content"],
        "https://uuapp.plus4u.net/uu-bookkit-maing01/guide01/book/page?code=install"
    );
    let description = items[0]["description"].as_str().expect("description");
    assert!(description.starts_with("Operations Guide - Installation - <url>"));
    assert!(description.ends_with("</url>"));
}

#[test]
///
/// fts rebuild が格納済みの全ページを再登録することを確認する。
fn fts_rebuild_cli_counts_pages() {
    let env = prepare_indexed_env();

    let output = env.run_ok(["fts", "rebuild"]);
    assert_eq!(output.trim(), "indexed: 3");

    let output = env.run_ok(["fts", "search", "installation"]);
    assert!(output.contains("Installation"));
}
