/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"page list"の実装
//!

use anyhow::Result;

use crate::cmd_args::{Options, PageListOpts};
use crate::engine::{Engine, SearchHit};
use super::common::{format_table, header_row, with_ready_engine};
use super::fts_search::describe_position;
use super::CommandContext;

///
/// "page list"サブコマンドのコンテキスト情報をパックした構造体
///
struct PageListCommandContext {
    engine: Engine,
    key: String,
    page_size: Option<usize>,
    page_num: usize,
    long_info: bool,
}

impl PageListCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options, sub_opts: &PageListOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            key: sub_opts.key(),
            page_size: sub_opts.page_size(),
            page_num: sub_opts.page_num(),
            long_info: sub_opts.is_long_info(),
        })
    }
}

// トレイトCommandContextの実装
impl CommandContext for PageListCommandContext {
    fn exec(&self) -> Result<()> {
        let key = self.key.clone();
        let page_size = self.page_size;
        let page_num = self.page_num;

        let result = with_ready_engine(&self.engine, |engine| async move {
            engine.search_with_filters(
                "",
                Some(key.as_str()),
                page_size,
                page_num,
            ).await
        })?;

        println!("{}", format_page_table(&result.pages, self.long_info));
        println!();
        println!("{}", describe_position(&result, self.page_num));
        Ok(())
    }
}

///
/// ページ一覧のテーブル生成
///
/// # 引数
/// * `pages` - ページ一覧
/// * `long_info` - 詳細表示の有無
///
/// # 戻り値
/// テーブル整形済み文字列を返す。
///
fn format_page_table(pages: &[SearchHit], long_info: bool) -> String {
    /*
     * ヘッダとデータ行の構築
     */
    let mut lines: Vec<Vec<String>> = Vec::with_capacity(pages.len() + 1);

    if long_info {
        lines.push(header_row(&["PAGE_ID", "CODE", "STATE", "PATH", "URL"]));
        for hit in pages {
            let page = hit.page();
            lines.push(vec![
                page_id(hit),
                page.code().to_string(),
                page.state().unwrap_or("-").to_string(),
                format_page_path(hit),
                hit.url().to_string(),
            ]);
        }
    } else {
        lines.push(header_row(&["PAGE_ID", "CODE", "NAME"]));
        for hit in pages {
            let page = hit.page();
            lines.push(vec![
                page_id(hit),
                page.code().to_string(),
                page.name().to_string(),
            ]);
        }
    }

    format_table(&lines)
}

fn page_id(hit: &SearchHit) -> String {
    hit.page()
        .id()
        .map(|id| id.to_string())
        .unwrap_or_default()
}

///
/// パンくずを含めたページパスの文字列を返す
///
fn format_page_path(hit: &SearchHit) -> String {
    let page = hit.page();
    let mut names: Vec<&str> = page.breadcrumbs()
        .iter()
        .map(|crumb| crumb.name())
        .collect();
    names.push(page.name());

    names.join(" > ")
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &PageListOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(PageListCommandContext::new(opts, sub_opts)?))
}
