/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ストア内容のエクスポートとインポートを実装するモジュール
//!

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::types::{BookInfo, PageInfo};
use super::{into_store_error, run_blocking, Engine, EngineError};

///
/// エクスポートデータ
///
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    /// 全ブック情報
    pub books: Vec<BookInfo>,

    /// 全ページ情報
    pub pages: Vec<PageInfo>,

    /// エクスポート日時
    pub export_date: DateTime<Utc>,
}

///
/// インポート結果
///
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// 追加したブック数
    pub books_added: usize,

    /// 追加したページ数
    pub pages_added: usize,

    /// インポート前のストアが空だったか否か
    pub was_empty_database: bool,
}

impl Engine {
    ///
    /// ストア内容のエクスポート
    ///
    /// # 戻り値
    /// 全ブックと全ページを格納したエクスポートデータを`Ok()`でラップして返
    /// す。
    ///
    pub async fn export(&self) -> Result<ExportData> {
        let engine = self.clone();

        run_blocking(move || {
            Ok(ExportData {
                books: engine.db.get_all_books()?,
                pages: engine.db.get_all_pages()?,
                export_date: Utc::now(),
            })
        }).await
    }

    ///
    /// エクスポートデータのインポート
    ///
    /// # 概要
    /// 既存のレコードに対してマージを行う。ブックはドキュメントキーで、ページ
    /// は(ドキュメントキー, コード, ページ名)の組で重複を判定し、既存のもの
    /// は取り込まない。ページIDは振り直す。取り込み後にインデックスを全再構築
    /// する。
    ///
    /// # 引数
    /// * `json` - エクスポートデータのJSON文字列
    ///
    /// # 戻り値
    /// 取り込み結果を`Ok()`でラップして返す。`books`または`pages`が配列でない
    /// 場合は`EngineError::ImportFormat`を返す。
    ///
    /// # 注記
    /// (ドキュメントキー, コード)が既存のページと衝突し名前が異なるページは警
    /// 告を出力して読み飛ばす。
    ///
    pub async fn import(&self, json: &str) -> Result<ImportSummary> {
        let (books, pages) = parse_import(json)?;
        let engine = self.clone();

        run_blocking(move || {
            let _writer = engine.lock_index_writer()?;

            let was_empty_database = engine.db.get_all_books()?.is_empty()
                && engine.db.get_all_pages()?.is_empty();

            let summary = engine.db.write(|writer| {
                let mut summary = ImportSummary {
                    was_empty_database,
                    ..Default::default()
                };

                /*
                 * ブック
                 */
                for book in books {
                    if writer.get_book(book.document_key())?.is_none() {
                        writer.put_book(&book)?;
                        summary.books_added += 1;
                    }
                }

                /*
                 * ページ
                 */
                let mut known_codes: HashMap<(String, String), String> =
                    HashMap::new();
                let mut loaded_keys: HashSet<String> = HashSet::new();

                for page in pages {
                    let key = page.document_key().to_string();
                    if loaded_keys.insert(key.clone()) {
                        for stored in writer.get_pages_by_key(&key)? {
                            known_codes.insert(
                                (key.clone(), stored.code().to_string()),
                                stored.name().to_string(),
                            );
                        }
                    }

                    let code_key = (key, page.code().to_string());
                    match known_codes.get(&code_key) {
                        Some(name) if name == page.name() => continue,
                        Some(_) => {
                            warn!(
                                "skip page conflicting on code: {}/{}",
                                code_key.0,
                                code_key.1,
                            );
                            continue;
                        }
                        None => {}
                    }

                    known_codes.insert(code_key, page.name().to_string());
                    writer.add_page(page.without_id())?;
                    summary.pages_added += 1;
                }

                Ok(summary)
            }).map_err(into_store_error)?;

            let index = engine.rebuild_locked()?;
            engine.publish_index(index)?;

            info!(
                "imported {} books and {} pages",
                summary.books_added,
                summary.pages_added,
            );

            Ok(summary)
        }).await
    }
}

///
/// インポートデータの解析
///
fn parse_import(json: &str) -> Result<(Vec<BookInfo>, Vec<PageInfo>)> {
    let data: Value = serde_json::from_str(json)
        .map_err(|err| anyhow!(EngineError::ImportFormat(err.to_string())))?;

    let books = match data.get("books") {
        Some(books @ Value::Array(_)) => {
            Vec::<BookInfo>::deserialize(books).map_err(|err| {
                anyhow!(EngineError::ImportFormat(format!("books: {}", err)))
            })?
        }
        _ => {
            return Err(anyhow!(EngineError::ImportFormat(
                "books array is missing".to_string()
            )));
        }
    };

    let pages = match data.get("pages") {
        Some(pages @ Value::Array(_)) => {
            Vec::<PageInfo>::deserialize(pages).map_err(|err| {
                anyhow!(EngineError::ImportFormat(format!("pages: {}", err)))
            })?
        }
        _ => {
            return Err(anyhow!(EngineError::ImportFormat(
                "pages array is missing".to_string()
            )));
        }
    };

    Ok((books, pages))
}
