/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"fts search"の実装
//!

use anyhow::Result;

use crate::cmd_args::{FtsSearchOpts, Options};
use crate::engine::{Engine, SearchHit, SearchPage};
use super::common::{format_table, header_row, with_ready_engine};
use super::CommandContext;

///
/// "fts search"サブコマンドのコンテキスト情報をパックした構造体
///
struct FtsSearchCommandContext {
    engine: Engine,
    query: String,
    book_key: Option<String>,
    page_size: Option<usize>,
    page_num: usize,
    filtered: bool,
}

impl FtsSearchCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options, sub_opts: &FtsSearchOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            query: sub_opts.query(),
            book_key: sub_opts.book_key(),
            page_size: sub_opts.page_size(),
            page_num: sub_opts.page_num(),
            filtered: sub_opts.is_filtered(),
        })
    }
}

// CommandContextトレイトの実装
impl CommandContext for FtsSearchCommandContext {
    fn exec(&self) -> Result<()> {
        let query = self.query.clone();
        let book_key = self.book_key.clone();
        let page_size = self.page_size;
        let page_num = self.page_num;
        let filtered = self.filtered;

        let result = with_ready_engine(&self.engine, |engine| async move {
            if filtered {
                engine.search_with_filters(
                    &query,
                    book_key.as_deref(),
                    page_size,
                    page_num,
                ).await
            } else {
                let pages = engine.search(&query).await?;
                Ok(SearchPage { pages, total_pages: 1, has_more: false })
            }
        })?;

        if result.pages.is_empty() {
            println!("no pages found");
            return Ok(());
        }

        println!("{}", format_hit_table(&result.pages));
        if filtered {
            println!();
            println!("{}", describe_position(&result, self.page_num));
        }

        Ok(())
    }
}

///
/// 検索結果のテーブル生成
///
/// # 注記
/// スコアを持たない結果(ページ一覧)はスコア欄を"-"で表示する。
///
fn format_hit_table(hits: &[SearchHit]) -> String {
    let mut lines = Vec::with_capacity(hits.len() + 1);
    lines.push(header_row(&["SCORE", "PAGE_ID", "BOOK", "NAME", "URL"]));

    for hit in hits {
        let page = hit.page();
        lines.push(vec![
            hit.score()
                .map(|score| format!("{:.3}", score))
                .unwrap_or_else(|| "-".to_string()),
            page.id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            page.document_key().to_string(),
            page.name().to_string(),
            hit.url().to_string(),
        ]);
    }

    format_table(&lines)
}

///
/// 現在位置の表示文字列の生成
///
pub(crate) fn describe_position(result: &SearchPage, page_num: usize) -> String {
    format!(
        "page {}/{}{}",
        page_num + 1,
        result.total_pages.max(1),
        if result.has_more { " (more)" } else { "" },
    )
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &FtsSearchOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(FtsSearchCommandContext::new(opts, sub_opts)?))
}
