/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! database モジュールのテストをまとめたモジュール
//!

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::anyhow;
use chrono::Local;

use super::{DatabaseManager, DbError};
use super::types::{BookInfo, PageId, PageInfo};

///
/// ページ登録時にIDが連番で払い出されることを確認する。
///
/// # 注記
/// 削除済みページのIDが再利用されないことも合わせて検証する。
///
#[test]
fn add_page_assigns_sequential_ids() {
    let (base_dir, db_path) = prepare_test_dirs();
    let manager = DatabaseManager::open(&db_path).expect("open manager failed");

    let first = manager.write(|writer| {
        writer.add_page(PageInfo::new("key", "p1", "One", "Book"))
    }).expect("add p1 failed");
    let second = manager.write(|writer| {
        writer.add_page(PageInfo::new("key", "p2", "Two", "Book"))
    }).expect("add p2 failed");

    assert_eq!(first.id(), Some(PageId::new(1)));
    assert_eq!(second.id(), Some(PageId::new(2)));

    manager.write(|writer| writer.delete_page(PageId::new(2)))
        .expect("delete p2 failed");
    let third = manager.write(|writer| {
        writer.add_page(PageInfo::new("key", "p2", "Two", "Book"))
    }).expect("re-add p2 failed");
    assert_eq!(third.id(), Some(PageId::new(3)));

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}

///
/// 同一ドキュメント内のコード重複が拒否されることを確認する。
///
#[test]
fn add_page_rejects_duplicate_code() {
    let (base_dir, db_path) = prepare_test_dirs();
    let manager = DatabaseManager::open(&db_path).expect("open manager failed");

    manager.write(|writer| {
        writer.add_page(PageInfo::new("key", "p1", "One", "Book"))
    }).expect("add p1 failed");

    let err = manager.write(|writer| {
        writer.add_page(PageInfo::new("key", "p1", "Again", "Book"))
    }).expect_err("duplicate must fail");
    assert!(matches!(
        err.downcast_ref::<DbError>(),
        Some(DbError::PageCodeConflict)
    ));

    // 別ドキュメントなら同じコードを登録できる
    manager.write(|writer| {
        writer.add_page(PageInfo::new("other", "p1", "One", "Other"))
    }).expect("add other p1 failed");

    assert_eq!(manager.get_all_pages().expect("list failed").len(), 2);

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}

///
/// 書き込み単位が失敗した場合に変更が破棄されることを確認する。
///
#[test]
fn failed_write_discards_all_changes() {
    let (base_dir, db_path) = prepare_test_dirs();
    let manager = DatabaseManager::open(&db_path).expect("open manager failed");

    let result: anyhow::Result<()> = manager.write(|writer| {
        writer.put_book(&BookInfo::new("key", "Book", Local::now()))?;
        writer.add_page(PageInfo::new("key", "p1", "One", "Book"))?;
        Err(anyhow!("abort"))
    });
    assert!(result.is_err());

    assert!(manager.get_book_by_key("key").expect("get failed").is_none());
    assert!(manager.get_pages_by_key("key").expect("list failed").is_empty());

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}

///
/// 部分取得が件数指定通りにページを切り出すことを確認する。
///
#[test]
fn page_window_skips_and_limits() {
    let (base_dir, db_path) = prepare_test_dirs();
    let manager = DatabaseManager::open(&db_path).expect("open manager failed");

    manager.write(|writer| {
        for i in 0..25 {
            let code = format!("p{:02}", i);
            writer.add_page(PageInfo::new("key", &code, &code, "Book"))?;
        }
        Ok(())
    }).expect("add pages failed");

    assert_eq!(manager.count_pages_by_key("key").expect("count failed"), 25);

    let window = manager.get_pages_by_key_window("key", 10, 10, 3)
        .expect("window failed");
    let codes: Vec<&str> = window.iter().map(|page| page.code()).collect();
    assert_eq!(codes.first(), Some(&"p10"));
    assert_eq!(codes.last(), Some(&"p19"));
    assert_eq!(codes.len(), 10);

    let tail = manager.get_pages_by_key_window("key", 20, 10, 100)
        .expect("window failed");
    assert_eq!(tail.len(), 5);

    let beyond = manager.get_pages_by_key_window("key", 30, 10, 100)
        .expect("window failed");
    assert!(beyond.is_empty());

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}

///
/// 全消去でブック・ページ・索引が空になることを確認する。
///
#[test]
fn clear_records_removes_books_and_pages() {
    let (base_dir, db_path) = prepare_test_dirs();
    let manager = DatabaseManager::open(&db_path).expect("open manager failed");

    manager.write(|writer| {
        writer.put_book(&BookInfo::new("key", "Book", Local::now()))?;
        writer.add_page(PageInfo::new("key", "p1", "One", "Book"))?;
        writer.put_index_dump("{}".to_string())
    }).expect("setup failed");

    manager.write(|writer| writer.clear_records()).expect("clear failed");

    assert!(manager.get_all_books().expect("books failed").is_empty());
    assert!(manager.get_all_pages().expect("pages failed").is_empty());
    assert_eq!(manager.count_pages_by_key("key").expect("count failed"), 0);
    assert_eq!(
        manager.get_index_dump().expect("dump failed").as_deref(),
        Some("{}")
    );

    // 消去後も同じコードを登録できる
    manager.write(|writer| {
        writer.add_page(PageInfo::new("key", "p1", "One", "Book"))
    }).expect("re-add failed");

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}

///
/// データベースを開き直しても内容が保持されることを確認する。
///
#[test]
fn records_survive_reopen() {
    let (base_dir, db_path) = prepare_test_dirs();

    {
        let manager = DatabaseManager::open(&db_path)
            .expect("open manager failed");
        manager.write(|writer| {
            writer.put_book(&BookInfo::new("key", "Book", Local::now()))?;
            writer.add_page(PageInfo::new("key", "p1", "One", "Book"))?;
            Ok(())
        }).expect("setup failed");
        manager.put_index_dump("dump".to_string()).expect("dump failed");
    }

    let manager = DatabaseManager::open(&db_path).expect("reopen failed");
    let book = manager.get_book_by_key("key")
        .expect("get failed")
        .expect("book missing");
    assert_eq!(book.name(), "Book");
    assert_eq!(
        manager.get_page_by_id(PageId::new(1))
            .expect("get page failed")
            .map(|page| page.code().to_string()),
        Some("p1".to_string())
    );
    assert_eq!(
        manager.get_index_dump().expect("dump failed").as_deref(),
        Some("dump")
    );

    fs::remove_dir_all(base_dir).expect("cleanup failed");
}

///
/// テスト用の一時ディレクトリとDBパスを生成する。
///
/// # 戻り値
/// テスト用ディレクトリとDBファイルパスのタプルを返す。
///
fn prepare_test_dirs() -> (PathBuf, PathBuf) {
    let base = Path::new("tests").join("tmp").join(unique_suffix());
    fs::create_dir_all(&base).expect("create test dir failed");
    let db_path = base.join("database.redb");
    (base, db_path)
}

///
/// テスト用の一意なサフィックスを生成する。
///
fn unique_suffix() -> String {
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
