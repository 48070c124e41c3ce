/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"book list"の実装
//!

use anyhow::Result;
use chrono::SecondsFormat;

use crate::cmd_args::{BookListOpts, Options};
use crate::engine::{BookSummary, Engine};
use super::common::{block_on, format_table, header_row};
use super::CommandContext;

///
/// "book list"サブコマンドのコンテキスト情報をパックした構造体
///
struct BookListCommandContext {
    engine: Engine,
    long_info: bool,
}

impl BookListCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options, sub_opts: &BookListOpts) -> Result<Self> {
        Ok(Self {
            engine: opts.open_engine()?,
            long_info: sub_opts.is_long_info(),
        })
    }
}

// CommandContextトレイトの実装
impl CommandContext for BookListCommandContext {
    fn exec(&self) -> Result<()> {
        let engine = self.engine.clone();
        let books = block_on(async move {
            engine.get_book_summaries().await
        })?;

        println!("{}", format_book_table(&books, self.long_info));
        Ok(())
    }
}

///
/// ブック一覧のテーブル生成
///
/// # 引数
/// * `books` - ページ数付きのブック一覧
/// * `long_info` - 詳細表示の有無
///
/// # 戻り値
/// テーブル整形済み文字列を返す。
///
fn format_book_table(books: &[BookSummary], long_info: bool) -> String {
    let mut lines: Vec<Vec<String>> = Vec::with_capacity(books.len() + 1);

    if long_info {
        lines.push(header_row(&["KEY", "PAGES", "LAST_UPDATE", "NAME"]));
        for summary in books {
            let book = &summary.book;
            lines.push(vec![
                book.document_key().to_string(),
                summary.page_count.to_string(),
                book.last_update().to_rfc3339_opts(SecondsFormat::Secs, true),
                book.name().to_string(),
            ]);
        }
    } else {
        lines.push(header_row(&["KEY", "PAGES", "NAME"]));
        for summary in books {
            let book = &summary.book;
            lines.push(vec![
                book.document_key().to_string(),
                summary.page_count.to_string(),
                book.name().to_string(),
            ]);
        }
    }

    format_table(&lines)
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &BookListOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(BookListCommandContext::new(opts, sub_opts)?))
}
