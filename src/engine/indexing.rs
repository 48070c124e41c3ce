/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 文書ペイロードのインデックス処理を実装するモジュール
//!

use anyhow::Result;
use chrono::Local;
use log::{debug, info, warn};
use serde_json::{json, Value};
use url::Url;

use crate::database::types::{BookInfo, PageInfo};
use crate::fts::FtsDocument;
use crate::indexer::assemble::{is_truthy, require_str};
use crate::indexer::{
    assemble_loose, assemble_structured, get_patch, resolve_document_key,
    split_patch, AssembledDocument, DocumentKind,
};
use super::{into_store_error, run_blocking, Engine};

///
/// インデックス処理のオプション
///
#[derive(Clone, Debug, Default)]
pub struct IndexOptions {
    /// 有効期限内のブックも再インデックスする
    pub force: bool,

    /// ペイロードの`url`の代わりに使用するURL
    pub url: Option<String>,
}

///
/// インデックス処理の結果
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IndexOutcome {
    /// ページ一覧を更新した
    Indexed {
        /// ドキュメントキー
        key: String,

        /// 削除したページ数
        removed: usize,

        /// 追加したページ数
        added: usize,
    },

    /// 有効期限内のため何もしなかった
    Skipped {
        /// ドキュメントキー
        key: String,
    },
}

impl IndexOutcome {
    ///
    /// ドキュメントキーへのアクセサ
    ///
    pub fn key(&self) -> &str {
        match self {
            Self::Indexed { key, .. } => key,
            Self::Skipped { key } => key,
        }
    }
}

///
/// インデックス処理の入力
///
#[derive(Debug)]
struct PreparedSource {
    /// 組み立て対象の文書
    document: Value,

    /// 文書を取得したURL
    url: String,
}

impl Engine {
    ///
    /// 文書ペイロードのインデックス処理
    ///
    /// # 概要
    /// URLからドキュメントキーを導出してページ一覧を組み立て、格納済みの一覧
    /// との差分をストアとインデックスに反映する。
    ///
    /// # 引数
    /// * `payload` - 文書ペイロード
    /// * `kind` - ソースの種別
    /// * `options` - 処理オプション
    ///
    /// # 戻り値
    /// 処理結果を`Ok()`でラップして返す。
    ///
    /// # 注記
    /// 同じドキュメントキーに対する処理は直列化される。ブックの最終更新日時が
    /// 有効期間内の場合は`force`を指定しない限り何もしない。
    ///
    pub async fn index_document(
        &self,
        payload: Value,
        kind: DocumentKind,
        options: IndexOptions,
    ) -> Result<IndexOutcome> {
        let source = prepare_source(payload, kind, options.url.as_deref())?;
        self.index_source(source, kind, options.force).await
    }

    ///
    /// 代替文書による再試行付きの緩い構造の文書のインデックス処理
    ///
    /// # 概要
    /// 処理に失敗した場合、同じURLに対してホスト名とパス末尾だけから作った
    /// 代替文書で一度だけ再試行する。
    ///
    /// # 戻り値
    /// 処理結果を`Ok()`でラップして返す。再試行も失敗した場合は最初のエラー
    /// を返す。
    ///
    pub async fn index_loose_with_fallback(
        &self,
        payload: Value,
        options: IndexOptions,
    ) -> Result<IndexOutcome> {
        let url = match &options.url {
            Some(url) => url.clone(),
            None => require_str(&payload, "url")?.to_string(),
        };

        let err = match self.index_document(
            payload,
            DocumentKind::Loose,
            options.clone(),
        ).await {
            Ok(outcome) => return Ok(outcome),
            Err(err) => err,
        };

        let Some(document) = fallback_document(&url) else {
            return Err(err);
        };

        warn!("indexing {} failed, retrying with fallback: {:#}", url, err);

        let source = PreparedSource { document, url };
        match self.index_source(source, DocumentKind::Loose, options.force).await {
            Ok(outcome) => Ok(outcome),
            Err(retry_err) => {
                warn!("fallback indexing failed: {:#}", retry_err);
                Err(err)
            }
        }
    }

    ///
    /// 準備済み入力のインデックス処理
    ///
    async fn index_source(
        &self,
        source: PreparedSource,
        kind: DocumentKind,
        force: bool,
    ) -> Result<IndexOutcome> {
        let key = resolve_document_key(&source.url, kind)?;
        self.ensure_index()?;

        let _guard = self.locks.lock(&key).await?;
        debug!("indexing {} as {}", key, kind);

        let assembled = match kind {
            DocumentKind::Structured => {
                assemble_structured(&source.document, &key)?
            }

            DocumentKind::Loose => {
                assemble_loose(&source.document, &source.url, &key)?
            }
        };

        let engine = self.clone();
        run_blocking(move || engine.apply_assembled(key, assembled, force))
            .await
    }

    ///
    /// 組み立て結果をストアとインデックスに反映する
    ///
    /// # 注記
    /// ストアの更新は1つの書き込みトランザクションで行い、コミットに成功した
    /// 場合のみインデックスの作業コピーを公開する。
    ///
    fn apply_assembled(
        &self,
        key: String,
        assembled: AssembledDocument,
        force: bool,
    ) -> Result<IndexOutcome> {
        let _writer = self.lock_index_writer()?;
        let mut index = self.snapshot_index()?;
        let now = Local::now();
        let expiration = self.settings.expiration;

        let outcome = self.db.write(|writer| {
            /*
             * 有効期限の確認
             */
            let stored_book = writer.get_book(&key)?;
            if let Some(book) = &stored_book {
                if !force && book.is_fresh(now, expiration) {
                    return Ok(IndexOutcome::Skipped { key: key.clone() });
                }
            }

            let book = match stored_book {
                Some(mut book) => {
                    book.set_last_update(now);
                    book
                }
                None => BookInfo::new(&key, &assembled.book_name, now),
            };
            writer.put_book(&book)?;

            /*
             * 差分の反映
             */
            let stored = writer.get_pages_by_key(&key)?;
            let (removed, added) = split_patch(get_patch(
                &stored,
                &assembled.pages,
                PageInfo::is_equivalent,
            ));

            for page in &removed {
                if let Some(id) = page.id() {
                    writer.delete_page(id)?;
                    index.remove_doc(id);
                }
            }

            let added_count = added.len();
            for page in added {
                let page = writer.add_page(page)?;
                if let Some(id) = page.id() {
                    index.add_doc(id, &FtsDocument::from_page(&page));
                }
            }

            writer.put_index_dump(index.serialize()?)?;

            Ok(IndexOutcome::Indexed {
                key: key.clone(),
                removed: removed.len(),
                added: added_count,
            })
        }).map_err(into_store_error)?;

        match &outcome {
            IndexOutcome::Indexed { key, removed, added } => {
                self.publish_index(index)?;
                info!("indexed {}: removed {}, added {}", key, removed, added);
            }

            IndexOutcome::Skipped { key } => {
                info!("skipped {}: index is still fresh", key);
            }
        }

        Ok(outcome)
    }
}

///
/// ペイロードからインデックス処理の入力を取り出す
///
/// # 引数
/// * `payload` - 文書ペイロード
/// * `kind` - ソースの種別
/// * `url` - ペイロードの`url`の代わりに使用するURL
///
/// # 注記
/// 緩い構造の文書は`document`、`data.document`、ペイロード全体の順に探す。
///
fn prepare_source(payload: Value, kind: DocumentKind, url: Option<&str>)
    -> Result<PreparedSource>
{
    let url = match url {
        Some(url) => url.to_string(),
        None => require_str(&payload, "url")?.to_string(),
    };

    let document = match kind {
        DocumentKind::Structured => payload,
        DocumentKind::Loose => loose_document(payload),
    };

    Ok(PreparedSource { document, url })
}

///
/// 緩い構造のペイロードから文書オブジェクトを取り出す
///
fn loose_document(mut payload: Value) -> Value {
    if let Some(document) = payload.get_mut("document") {
        if is_truthy(document) {
            return document.take();
        }
    }

    if let Some(document) = payload.pointer_mut("/data/document") {
        if is_truthy(document) {
            return document.take();
        }
    }

    payload
}

///
/// URLだけから代替文書を生成する
///
/// # 戻り値
/// URLが解析できない場合は`None`を返す。
///
fn fallback_document(url: &str) -> Option<Value> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str().unwrap_or_default();
    let id = parsed.path().rsplit('/').next().unwrap_or_default();

    Some(json!({
        "name": format!("Document from {}", host),
        "id": id,
    }))
}
