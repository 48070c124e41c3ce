/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! engine モジュールのテストをまとめたモジュール
//!

use chrono::Duration;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::database::types::{PageId, PageInfo};
use crate::indexer::DocumentKind;
use super::*;

/// テスト用ブックのURL
const BOOK_URL: &str =
    "https://uuapp.plus4u.net/uu-bookkit-maing01/abc123-guide01/book/page?code=home";

/// テスト用ブックのドキュメントキー
const BOOK_KEY: &str = "guide01";

fn open_engine(dir: &TempDir) -> Engine {
    Engine::open(dir.path().join("docseek.redb"), EngineSettings::default())
        .expect("open engine failed")
}

async fn ready_engine(dir: &TempDir) -> Engine {
    let engine = open_engine(dir);
    engine.initialize_index().await.expect("initialize failed");
    engine
}

///
/// メニュー(コード, ラベル, インデント)からブック形式のペイロードを生成
///
fn structured_payload(menu: &[(&str, &str, i64)]) -> Value {
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
            "itemMap": {
                "home": {"label": {"en": "Home"}, "state": "active"}
            }
        }
    })
}

fn forced() -> IndexOptions {
    IndexOptions { force: true, url: None }
}

///
/// ブック形式の文書が登録され検索できることを確認する。
///
#[tokio::test]
async fn structured_document_becomes_searchable() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    let outcome = engine.index_document(
        structured_payload(&[
            ("home", "Home", 0),
            ("install", "Installation", 1),
            ("upgrade", "Upgrade Notes", 2),
        ]),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    assert_eq!(outcome, IndexOutcome::Indexed {
        key: BOOK_KEY.to_string(),
        removed: 0,
        added: 3,
    });

    let hits = engine.search("installation").await.expect("search failed");
    assert_eq!(hits.len(), 1);

    let page = hits[0].page();
    assert_eq!(page.code(), "install");
    assert_eq!(page.book_name(), "Operations Guide");
    assert_eq!(page.color(), Some("#336699"));
    assert_eq!(
        hits[0].url(),
        format!("{}/{}/book/page?code=install", DEFAULT_PAGE_URL_BASE, BOOK_KEY)
    );
    assert_eq!(
        hits[0].book_url(),
        format!("{}/{}", DEFAULT_PAGE_URL_BASE, BOOK_KEY)
    );

    let hits = engine.search("upgrade").await.expect("search failed");
    let crumbs: Vec<&str> = hits[0].page().breadcrumbs().iter()
        .map(|crumb| crumb.code())
        .collect();
    assert_eq!(crumbs, vec!["home", "install"]);
}

///
/// 有効期限内の再インデックスがスキップされ、強制指定で差分が反映されるこ
/// とを確認する。
///
#[tokio::test]
async fn fresh_book_is_skipped_unless_forced() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    engine.index_document(
        structured_payload(&[("home", "Home", 0), ("faq", "Questions", 0)]),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let next = structured_payload(&[("home", "Home", 0), ("news", "Changelog", 0)]);

    let outcome = engine.index_document(
        next.clone(),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");
    assert_eq!(outcome, IndexOutcome::Skipped { key: BOOK_KEY.to_string() });

    let outcome = engine.index_document(next, DocumentKind::Structured, forced())
        .await
        .expect("index failed");
    assert_eq!(outcome, IndexOutcome::Indexed {
        key: BOOK_KEY.to_string(),
        removed: 1,
        added: 1,
    });

    assert!(engine.search("questions").await.expect("search failed").is_empty());
    assert_eq!(engine.search("changelog").await.expect("search failed").len(), 1);

    let books = engine.get_available_books().await.expect("books failed");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].name(), "Operations Guide");
}

///
/// 有効期間が0の場合は毎回再インデックスされることを確認する。
///
#[tokio::test]
async fn zero_expiration_always_reindexes() {
    let dir = TempDir::new().expect("tempdir failed");
    let settings = EngineSettings {
        expiration: Duration::zero(),
        ..Default::default()
    };
    let engine = Engine::open(dir.path().join("docseek.redb"), settings)
        .expect("open engine failed");
    engine.initialize_index().await.expect("initialize failed");

    let payload = structured_payload(&[("home", "Home", 0)]);
    for _ in 0..2 {
        let outcome = engine.index_document(
            payload.clone(),
            DocumentKind::Structured,
            IndexOptions::default(),
        ).await.expect("index failed");
        assert!(matches!(outcome, IndexOutcome::Indexed { .. }));
    }
}

///
/// 未初期化のインデックスに対する操作がエラーになることを確認する。
///
#[tokio::test]
async fn operations_require_initialized_index() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = open_engine(&dir);
    assert!(!engine.is_index_initialized());

    let err = engine.search("anything").await.expect_err("must fail");
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::IndexNotInitialized)
    ));

    let err = engine.index_document(
        structured_payload(&[("home", "Home", 0)]),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect_err("must fail");
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::IndexNotInitialized)
    ));
}

///
/// 規定外のブックURLがキー導出エラーになることを確認する。
///
#[tokio::test]
async fn unknown_book_url_is_rejected() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    let mut payload = structured_payload(&[("home", "Home", 0)]);
    payload["url"] = json!("https://example.com/book");

    let err = engine.index_document(
        payload,
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect_err("must fail");
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::UrlResolution(_))
    ));
}

///
/// 緩い構造の文書が保存済みURLで引けることを確認する。
///
#[tokio::test]
async fn loose_document_keeps_item_urls() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    let payload = json!({
        "url": "https://uuapp.plus4u.net/uu-managementkit-maing02/aaa-mgmt01/document?pageOid=p2",
        "document": {
            "name": "Quality Handbook",
            "pageList": [
                {"pageOid": "p1", "name": "Audits"},
                {"pageOid": "p2", "name": "Reviews"}
            ],
            "requestedPage": {"content": {"text": "checklist for peer reviews"}}
        }
    });

    let outcome = engine.index_loose_with_fallback(payload, IndexOptions::default())
        .await
        .expect("index failed");
    assert_eq!(outcome.key(), "mgmt01");

    let hits = engine.search("checklist").await.expect("search failed");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].page().code(), "p2");
    assert!(hits[0].url().contains("pageOid=p2"));
    assert_eq!(
        hits[0].book_url(),
        "https://uuapp.plus4u.net/uu-managementkit-maing02/aaa-mgmt01/document"
    );
}

///
/// 代替文書での再試行も失敗した場合に最初のエラーが返ることを確認する。
///
#[tokio::test]
async fn fallback_reports_original_error() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    let payload = json!({"url": "not a url", "document": {"name": "Broken"}});
    let err = engine.index_loose_with_fallback(payload, IndexOptions::default())
        .await
        .expect_err("must fail");
    assert!(format!("{:#}", err).contains("invalid document url"));

    assert!(engine.get_available_books().await.expect("books failed").is_empty());
}

///
/// 空クエリとキー指定でページ一覧が切り出されることを確認する。
///
#[tokio::test]
async fn empty_query_pages_through_book() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    let codes: Vec<String> = (0..25).map(|i| format!("p{:02}", i)).collect();
    let menu: Vec<(&str, &str, i64)> = codes.iter()
        .map(|code| (code.as_str(), code.as_str(), 0))
        .collect();
    let mut payload = structured_payload(&menu);
    payload["getBookStructure"]["itemMap"] = json!({});

    engine.index_document(
        payload,
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let mut listed: Vec<String> = Vec::new();
    let mut page_num = 0;
    loop {
        let page = engine.search_with_filters("", Some(BOOK_KEY), Some(10), page_num)
            .await
            .expect("list failed");
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.has_more, page_num < 2);
        assert!(page.pages.len() <= 10);

        listed.extend(page.pages.iter().map(|hit| hit.page().code().to_string()));
        if !page.has_more {
            break;
        }
        page_num += 1;
    }
    assert_eq!(page_num, 2);
    assert_eq!(listed, codes);

    let blank = engine.search_with_filters("  ", Some(BOOK_KEY), Some(10), 2)
        .await
        .expect("list failed");
    assert_eq!(blank.pages.len(), 5);
    assert_eq!(blank.pages[4].page().code(), "p24");

    let none = engine.search_with_filters("", None, None, 0)
        .await
        .expect("list failed");
    assert!(none.pages.is_empty());
}

///
/// スコア順の検索結果がキーで絞り込まれることを確認する。
///
#[tokio::test]
async fn ranked_search_is_filtered_by_key() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    engine.index_document(
        structured_payload(&[("deploy", "Deployment", 0)]),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let mut other = structured_payload(&[("deploy", "Deployment", 0)]);
    other["url"] = json!("https://uuapp.plus4u.net/uu-bookkit-maing01/other02");
    engine.index_document(
        other,
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let all = engine.search_with_filters("deployment", None, None, 0)
        .await
        .expect("search failed");
    assert_eq!(all.pages.len(), 2);

    let filtered = engine.search_with_filters("deployment", Some("other02"), None, 0)
        .await
        .expect("search failed");
    assert_eq!(filtered.pages.len(), 1);
    assert_eq!(filtered.pages[0].page().document_key(), "other02");
    assert_eq!(filtered.total_pages, 1);
    assert!(!filtered.has_more);
}

///
/// 入力補完候補の説明文がエスケープされることを確認する。
///
#[tokio::test]
async fn suggestions_escape_labels() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    engine.index_document(
        structured_payload(&[("rd", "R&D <Lab>", 0)]),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let suggestions = engine.suggestions("lab").await.expect("suggest failed");
    assert_eq!(suggestions.len(), 1);

    let url = format!("{}/{}/book/page?code=rd", DEFAULT_PAGE_URL_BASE, BOOK_KEY);
    assert_eq!(suggestions[0].content, url);
    assert_eq!(
        suggestions[0].description,
        format!("Operations Guide - R&amp;D &lt;Lab&gt; - <url>{}</url>", url)
    );
}

///
/// 最後のページを削除するとブックも削除されることを確認する。
///
#[tokio::test]
async fn deleting_last_page_removes_book() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    engine.index_document(
        structured_payload(&[("home", "Home", 0), ("faq", "Questions", 0)]),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let page = engine.delete_page(PageId::new(1)).await.expect("delete failed");
    assert_eq!(page.map(|page| page.code().to_string()), Some("home".to_string()));
    assert_eq!(engine.get_available_books().await.expect("books failed").len(), 1);

    engine.delete_page(PageId::new(2)).await.expect("delete failed");
    assert!(engine.get_available_books().await.expect("books failed").is_empty());
    assert!(engine.search("questions").await.expect("search failed").is_empty());

    let missing = engine.delete_page(PageId::new(2)).await.expect("delete failed");
    assert!(missing.is_none());
}

///
/// ブック削除で全ページとインデックスが消えることを確認する。
///
#[tokio::test]
async fn deleting_book_removes_pages() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    engine.index_document(
        structured_payload(&[("home", "Home", 0), ("faq", "Questions", 0)]),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let count = engine.delete_book(BOOK_KEY).await.expect("delete failed");
    assert_eq!(count, Some(2));
    assert!(engine.search("home").await.expect("search failed").is_empty());

    let count = engine.delete_book(BOOK_KEY).await.expect("delete failed");
    assert_eq!(count, None);
}

///
/// エクスポートしたデータを取り込み直せること、および重複が除外されること
/// を確認する。
///
#[tokio::test]
async fn export_import_restores_records() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    engine.index_document(
        structured_payload(&[("home", "Home", 0), ("faq", "Questions", 0)]),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let exported = engine.export().await.expect("export failed");
    assert_eq!(exported.books.len(), 1);
    assert_eq!(exported.pages.len(), 2);
    let json = serde_json::to_string(&exported).expect("serialize failed");

    engine.clear_all().await.expect("clear failed");
    assert!(engine.search("questions").await.expect("search failed").is_empty());

    let summary = engine.import(&json).await.expect("import failed");
    assert_eq!(summary, ImportSummary {
        books_added: 1,
        pages_added: 2,
        was_empty_database: true,
    });
    assert_eq!(engine.search("questions").await.expect("search failed").len(), 1);

    let summary = engine.import(&json).await.expect("import failed");
    assert_eq!(summary, ImportSummary {
        books_added: 0,
        pages_added: 0,
        was_empty_database: false,
    });
}

///
/// 保存したインデックスが再オープン後に復元されることを確認する。
///
#[tokio::test]
async fn index_survives_reopen() {
    let dir = TempDir::new().expect("tempdir failed");

    {
        let engine = ready_engine(&dir).await;
        engine.index_document(
            structured_payload(&[("home", "Home", 0), ("faq", "Questions", 0)]),
            DocumentKind::Structured,
            IndexOptions::default(),
        ).await.expect("index failed");
    }

    let engine = open_engine(&dir);
    let count = engine.initialize_index().await.expect("initialize failed");
    assert_eq!(count, 2);
    assert_eq!(engine.search("questions").await.expect("search failed").len(), 1);

    let rebuilt = engine.rebuild_index().await.expect("rebuild failed");
    assert_eq!(rebuilt, 2);
}

///
/// 同じキーへの並行インデックスが衝突せずに直列化されることを確認する。
///
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_indexing_of_same_key_is_serialized() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            engine.index_document(
                structured_payload(&[("home", "Home", 0), ("faq", "Questions", 0)]),
                DocumentKind::Structured,
                IndexOptions::default(),
            ).await
        }));
    }

    let mut indexed = 0;
    for task in tasks {
        let outcome = task.await.expect("join failed").expect("index failed");
        if matches!(outcome, IndexOutcome::Indexed { .. }) {
            indexed += 1;
        }
    }

    assert_eq!(indexed, 1);
    let listed = engine.search_with_filters("", Some(BOOK_KEY), None, 0)
        .await
        .expect("list failed");
    assert_eq!(listed.pages.len(), 2);
}

///
/// 同じコードのページを再インデックスすると最新の内容の1件だけが残ることを
/// 確認する。
///
#[tokio::test]
async fn reindexed_code_keeps_single_latest_record() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = ready_engine(&dir).await;

    let payload = |home: &str| {
        let mut payload = structured_payload(&[
            ("home", home, 0),
            ("install", "Installation", 1),
        ]);
        payload["getBookStructure"]["itemMap"] = json!({});
        payload
    };

    engine.index_document(
        payload("Welcome"),
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let outcome = engine.index_document(
        payload("Start Page"),
        DocumentKind::Structured,
        forced(),
    ).await.expect("reindex failed");
    assert!(matches!(
        outcome,
        IndexOutcome::Indexed { removed: 1, added: 1, .. }
    ));

    let listed = engine.search_with_filters("", Some(BOOK_KEY), None, 0)
        .await
        .expect("list failed");
    let homes: Vec<&str> = listed.pages.iter()
        .filter(|hit| hit.page().code() == "home")
        .map(|hit| hit.page().name())
        .collect();
    assert_eq!(homes, vec!["Start Page"]);
    assert_eq!(listed.pages.len(), 2);

    assert!(engine.search("welcome").await.expect("search failed").is_empty());

    let hits = engine.search("start").await.expect("search failed");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].page().code(), "home");
}

///
/// 設定の件数が0でもページ分割に既定値が使われることを確認する。
///
#[tokio::test]
async fn zero_page_size_setting_falls_back_to_default() {
    let dir = TempDir::new().expect("tempdir failed");
    let settings = EngineSettings { page_size: 0, ..Default::default() };
    let engine = Engine::open(dir.path().join("docseek.redb"), settings)
        .expect("open engine failed");
    engine.initialize_index().await.expect("initialize failed");

    let mut payload = structured_payload(&[
        ("home", "Home", 0),
        ("faq", "Questions", 0),
    ]);
    payload["getBookStructure"]["itemMap"] = json!({});
    engine.index_document(
        payload,
        DocumentKind::Structured,
        IndexOptions::default(),
    ).await.expect("index failed");

    let listed = engine.search_with_filters("", Some(BOOK_KEY), None, 0)
        .await
        .expect("list failed");
    assert_eq!(listed.pages.len(), 2);
    assert_eq!(listed.total_pages, 1);
    assert!(!listed.has_more);

    let ranked = engine.search_with_filters("questions", None, Some(0), 0)
        .await
        .expect("search failed");
    assert_eq!(ranked.pages.len(), 1);
    assert_eq!(ranked.pages[0].page().code(), "faq");
}

///
/// 保持しているURLが再解析され、解析できない場合は導出形になることを確認
/// する。
///
#[test]
fn stored_page_url_is_normalized_or_derived() {
    let dir = TempDir::new().expect("tempdir failed");
    let engine = open_engine(&dir);

    let page = PageInfo::new("mgmt01", "p1", "Audits", "Handbook")
        .with_url(Some("HTTPS://Example.COM/doc?pageOid=p1".to_string()));
    assert_eq!(engine.page_url(&page), "https://example.com/doc?pageOid=p1");

    let page = PageInfo::new("mgmt01", "p1", "Audits", "Handbook")
        .with_url(Some("not a url".to_string()));
    assert_eq!(
        engine.page_url(&page),
        format!("{}/mgmt01/book/page?code=p1", DEFAULT_PAGE_URL_BASE)
    );
}
