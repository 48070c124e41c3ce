/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 検索とページ一覧の参照操作を実装するモジュール
//!

use anyhow::Result;
use log::warn;
use serde::Serialize;
use url::Url;

use crate::database::types::{BookInfo, PageId, PageInfo};
use crate::fts::FtsSearchResult;
use super::{run_blocking, Engine, DEFAULT_PAGE_SIZE};

/// 検索結果のページ情報を一度に解決する件数
const RESOLVE_BATCH_SIZE: usize = 10;

/// カーソルを一度に進める最大件数
const CURSOR_SKIP_STEP: usize = 100;

///
/// 検索結果の1件
///
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// ページ情報
    page: PageInfo,

    /// スコア(ページ一覧の場合は`None`)
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,

    /// ページのURL
    url: String,

    /// ブックのURL
    book_url: String,
}

impl SearchHit {
    ///
    /// ページ情報へのアクセサ
    ///
    pub fn page(&self) -> &PageInfo {
        &self.page
    }

    ///
    /// スコアへのアクセサ
    ///
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    ///
    /// ページURLへのアクセサ
    ///
    pub fn url(&self) -> &str {
        &self.url
    }

    ///
    /// ブックURLへのアクセサ
    ///
    pub fn book_url(&self) -> &str {
        &self.book_url
    }
}

///
/// ページ単位に切り出した検索結果
///
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// 検索結果
    pub pages: Vec<SearchHit>,

    /// 総ページ数
    pub total_pages: u64,

    /// 後続のページが存在するか否か
    pub has_more: bool,
}

impl SearchPage {
    ///
    /// スコア順の検索結果から生成
    ///
    /// # 注記
    /// スコア順の検索結果は総件数を持たないため、常に1ページのみとして扱う。
    ///
    fn ranked(pages: Vec<SearchHit>) -> Self {
        Self { pages, total_pages: 1, has_more: false }
    }
}

///
/// ブック一覧の1件
///
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    /// ブック情報
    pub book: BookInfo,

    /// 所属ページ数
    pub page_count: u64,
}

///
/// 入力補完の候補
///
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Suggestion {
    /// 候補選択時に入力される内容(ページURL)
    pub content: String,

    /// 候補の説明(マークアップ付き)
    pub description: String,
}

impl Engine {
    ///
    /// 全文検索
    ///
    /// # 引数
    /// * `query` - 検索クエリ
    ///
    /// # 戻り値
    /// スコア順に最大`max_suggestions`件の検索結果を`Ok()`でラップして返す。
    /// クエリが空の場合は空の一覧を返す。
    ///
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.ensure_index()?;

        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let engine = self.clone();
        run_blocking(move || {
            let mut results = engine.with_index(|index| {
                index.search(&query, true)
            })?;
            results.truncate(engine.settings.max_suggestions);

            engine.resolve_hits(&results)
        }).await
    }

    ///
    /// 絞り込みとページ分割付きの全文検索
    ///
    /// # 引数
    /// * `query` - 検索クエリ
    /// * `book_key` - 絞り込むドキュメントキー
    /// * `page_size` - 1ページあたりの件数(`None`または0で既定値)
    /// * `page_num` - 0始まりのページ番号
    ///
    /// # 戻り値
    /// 切り出した検索結果を`Ok()`でラップして返す。
    ///
    /// # 注記
    /// クエリが空でドキュメントキーが指定された場合は、そのキーに属するペー
    /// ジをID順に切り出して返す。クエリもキーも空の場合は空の結果を返す。
    ///
    pub async fn search_with_filters(
        &self,
        query: &str,
        book_key: Option<&str>,
        page_size: Option<usize>,
        page_num: usize,
    ) -> Result<SearchPage> {
        self.ensure_index()?;

        let size = self.effective_page_size(page_size);
        let query = query.trim().to_string();
        let key = book_key.map(str::to_string);
        let engine = self.clone();

        run_blocking(move || {
            if query.is_empty() {
                return match key {
                    Some(key) => engine.list_pages(&key, size, page_num),
                    None => Ok(SearchPage::ranked(Vec::new())),
                };
            }

            let results: Vec<FtsSearchResult> = engine.with_index(|index| {
                index.search(&query, true)
            })?
            .into_iter()
            .skip(page_num.saturating_mul(size))
            .take(size)
            .collect();

            let mut hits = engine.resolve_hits(&results)?;
            if let Some(key) = &key {
                hits.retain(|hit| hit.page.document_key() == key);
            }

            Ok(SearchPage::ranked(hits))
        }).await
    }

    ///
    /// 登録済みブックの一覧
    ///
    /// # 戻り値
    /// ドキュメントキー順に並べたブック情報を`Ok()`でラップして返す。
    ///
    pub async fn get_available_books(&self) -> Result<Vec<BookInfo>> {
        let engine = self.clone();
        run_blocking(move || engine.db.get_all_books()).await
    }

    ///
    /// ページ数付きのブック一覧
    ///
    pub async fn get_book_summaries(&self) -> Result<Vec<BookSummary>> {
        let engine = self.clone();

        run_blocking(move || {
            let mut summaries = Vec::new();
            for book in engine.db.get_all_books()? {
                let page_count = engine.db
                    .count_pages_by_key(book.document_key())?;
                summaries.push(BookSummary { book, page_count });
            }

            Ok(summaries)
        }).await
    }

    ///
    /// 入力補完候補の生成
    ///
    /// # 引数
    /// * `query` - 入力中の文字列
    ///
    /// # 戻り値
    /// 検索結果の順に並べた候補を`Ok()`でラップして返す。
    ///
    pub async fn suggestions(&self, query: &str) -> Result<Vec<Suggestion>> {
        let hits = self.search(query).await?;

        Ok(hits.into_iter()
            .map(|hit| {
                let page = &hit.page;
                let label = if page.book_name().is_empty() {
                    page.name().to_string()
                } else {
                    format!("{} - {}", page.book_name(), page.name())
                };

                Suggestion {
                    description: format!(
                        "{} - <url>{}</url>",
                        escape_html(&label),
                        escape_html(&hit.url),
                    ),
                    content: hit.url,
                }
            })
            .collect())
    }

    ///
    /// ドキュメントキーに属するページの切り出し
    ///
    fn list_pages(&self, key: &str, size: usize, page_num: usize)
        -> Result<SearchPage>
    {
        let count = self.db.count_pages_by_key(key)?;
        let total_pages = count.div_ceil(size as u64);

        let pages = self.db.get_pages_by_key_window(
            key,
            page_num.saturating_mul(size),
            size,
            CURSOR_SKIP_STEP,
        )?;

        Ok(SearchPage {
            pages: pages.into_iter()
                .map(|page| self.make_hit(page, None))
                .collect(),
            total_pages,
            has_more: (page_num as u64).saturating_add(1) < total_pages,
        })
    }

    ///
    /// 検索結果をページ情報に解決する
    ///
    /// # 注記
    /// 一定件数ずつまとめて読み込む。ストアに存在しないページは読み飛ばす。
    ///
    fn resolve_hits(&self, results: &[FtsSearchResult])
        -> Result<Vec<SearchHit>>
    {
        let mut hits = Vec::with_capacity(results.len());

        for batch in results.chunks(RESOLVE_BATCH_SIZE) {
            let ids: Vec<PageId> = batch.iter()
                .map(|result| result.page_id())
                .collect();

            for page in self.db.get_pages_by_ids(&ids)? {
                let score = batch.iter()
                    .find(|result| Some(result.page_id()) == page.id())
                    .map(|result| result.score());
                hits.push(self.make_hit(page, score));
            }
        }

        Ok(hits)
    }

    fn make_hit(&self, page: PageInfo, score: Option<f64>) -> SearchHit {
        SearchHit {
            url: self.page_url(&page),
            book_url: self.book_url(&page),
            score,
            page,
        }
    }

    ///
    /// ページURLの導出
    ///
    /// # 注記
    /// URLを保持しているページ(緩い構造のソース)は、そのURLを再解析して正規
    /// 化した形を使用する。解析できない場合はキーとコードから導出する。
    ///
    pub fn page_url(&self, page: &PageInfo) -> String {
        if let Some(url) = page.url() {
            match Url::parse(url) {
                Ok(parsed) => return parsed.to_string(),
                Err(err) => {
                    warn!("stored page url {} is unusable: {}", url, err);
                }
            }
        }

        format!(
            "{}/{}/book/page?code={}",
            self.url_base(),
            page.document_key(),
            page.code(),
        )
    }

    ///
    /// ブックURLの導出
    ///
    pub fn book_url(&self, page: &PageInfo) -> String {
        if let Some(parsed) = page.url().and_then(|url| Url::parse(url).ok()) {
            return format!(
                "{}{}",
                parsed.origin().ascii_serialization(),
                parsed.path(),
            );
        }

        format!("{}/{}", self.url_base(), page.document_key())
    }

    ///
    /// 1ページあたりの件数の決定
    ///
    /// # 注記
    /// 指定値が0または未指定の場合は設定値を使用し、設定値も0の場合は既定値
    /// を使用する。
    ///
    fn effective_page_size(&self, page_size: Option<usize>) -> usize {
        [page_size.unwrap_or(0), self.settings.page_size]
            .into_iter()
            .find(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn url_base(&self) -> &str {
        self.settings.page_url_base.trim_end_matches('/')
    }
}

///
/// HTMLの特殊文字のエスケープ
///
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }

    escaped
}
