/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 取得した文書データからページ一覧を組み立てるモジュール
//!

use std::collections::{BTreeMap, HashSet};

use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::database::types::{Breadcrumb, PageInfo};
use super::extract::extract_text;
use super::identity::{replace_query, PAGE_POINTER_PARAM};

/// 名前を持たない文書の既定名
const UNNAMED_DOCUMENT: &str = "Unnamed Document";

/// 名前を持たない項目の既定名
const UNNAMED_ITEM: &str = "Unnamed Item";

/// 状態を持たない項目の既定状態
const DEFAULT_STATE: &str = "active";

/// ページ位置が指定されていない場合の既定値
const DEFAULT_POINTER: &str = "main";

/// 項目一覧の探索先(優先順)
const COLLECTION_PATHS: [&[&str]; 7] = [
    &["items"],
    &["documents"],
    &["children"],
    &["list"],
    &["data", "items"],
    &["data", "documents"],
    &["data", "list"],
];

///
/// 組み立て結果
///
#[derive(Clone, Debug)]
pub struct AssembledDocument {
    /// ブック名
    pub book_name: String,

    /// ページ一覧(ID未割り当て)
    pub pages: Vec<PageInfo>,
}

/// 言語コード => 文字列
type LocalizedText = BTreeMap<String, Value>;

///
/// ブック形式のペイロード
///
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredPayload {
    load_book: LoadBook,
    get_book_structure: BookStructure,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadBook {
    #[serde(default)]
    name: LocalizedText,

    #[serde(default)]
    primary_language: String,

    menu: Vec<MenuItem>,

    #[serde(default)]
    theme: Option<Theme>,
}

#[derive(Debug, Deserialize)]
struct MenuItem {
    page: String,

    #[serde(default)]
    label: LocalizedText,

    #[serde(default)]
    indent: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Theme {
    #[serde(default)]
    main: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookStructure {
    #[serde(default)]
    item_map: BTreeMap<String, StructureItem>,
}

#[derive(Debug, Deserialize)]
struct StructureItem {
    #[serde(default)]
    label: LocalizedText,

    #[serde(default)]
    state: Option<String>,
}

///
/// ブック形式のページ一覧の組み立て
///
/// # 概要
/// メニュー順にページを生成してパンくずリストを計算し、その後メニューに現
/// れなかった構造情報の項目をパンくず無しで追加する。
///
/// # 引数
/// * `payload` - `loadBook`と`getBookStructure`を持つペイロード
/// * `key` - ドキュメントキー
///
/// # 戻り値
/// 組み立て結果を`Ok()`でラップして返す。必須要素が欠けている場合はエラー情
/// 報を`Err()`でラップして返す。
///
pub fn assemble_structured(payload: &Value, key: &str)
    -> Result<AssembledDocument>
{
    let payload = StructuredPayload::deserialize(payload)
        .context("invalid structured payload")?;

    let lang = payload.load_book.primary_language.as_str();
    let book_name = localized(&payload.load_book.name, lang);
    let color = payload.load_book.theme.and_then(|theme| theme.main);
    let menu = payload.load_book.menu;
    let mut item_map = payload.get_book_structure.item_map;

    let mut pages: Vec<PageInfo> = Vec::new();

    /*
     * メニュー由来のページ
     */
    for (index, item) in menu.iter().enumerate() {
        let breadcrumbs = breadcrumbs_for(&pages, &menu, index);
        let state = item_map.remove(&item.page)
            .and_then(|entry| entry.state);

        let page = PageInfo::new(
            key,
            &item.page,
            localized(&item.label, lang),
            &book_name,
        )
        .with_breadcrumbs(breadcrumbs)
        .with_color(color.clone())
        .with_state(state);

        pages.push(page);
    }

    /*
     * メニューに現れなかったページ
     */
    for (code, item) in item_map {
        let page = PageInfo::new(
            key,
            &code,
            localized(&item.label, lang),
            &book_name,
        )
        .with_color(color.clone())
        .with_state(item.state);

        pages.push(page);
    }

    Ok(AssembledDocument {
        pages: dedupe_codes(pages, key),
        book_name,
    })
}

///
/// パンくずリストの計算
///
/// # 概要
/// インデントが0の項目はパンくず無し。それ以外は直前から遡って最初に見つか
/// ったインデントの浅い項目を親とし、親のパンくずに親自身を加えたものを返
/// す。
///
fn breadcrumbs_for(pages: &[PageInfo], menu: &[MenuItem], index: usize)
    -> Vec<Breadcrumb>
{
    let indent = menu[index].indent.unwrap_or(0);
    if indent == 0 {
        return Vec::new();
    }

    for prev in (0..index).rev() {
        if menu[prev].indent.unwrap_or(0) < indent {
            let parent = &pages[prev];
            let mut breadcrumbs = parent.breadcrumbs().to_vec();
            breadcrumbs.push(Breadcrumb::new(parent.code(), parent.name()));
            return breadcrumbs;
        }
    }

    warn!("no parent menu item found for {}", menu[index].page);
    Vec::new()
}

///
/// 緩い構造の文書のページ一覧の組み立て
///
/// # 引数
/// * `document` - 文書オブジェクト
/// * `url` - 文書を取得したURL
/// * `key` - ドキュメントキー
///
/// # 戻り値
/// 組み立て結果を`Ok()`でラップして返す。URLが解析できない場合はエラー情報を
/// `Err()`でラップして返す。
///
/// # 注記
/// 本文テキストはURLのページ位置に一致する項目にのみ設定する。項目一覧が見
/// つからない場合は文書全体を1ページとして扱う。
///
pub fn assemble_loose(document: &Value, url: &str, key: &str)
    -> Result<AssembledDocument>
{
    let parsed = Url::parse(url)
        .with_context(|| format!("invalid document url: {}", url))?;

    let book_name = non_empty_str(document.get("name"))
        .unwrap_or(UNNAMED_DOCUMENT)
        .to_string();

    /*
     * 表示中ページの本文
     */
    let content = match document.get("requestedPage")
        .and_then(|page| page.get("content"))
        .filter(|content| is_truthy(content))
    {
        Some(content) => extract_text(content),
        None => extract_text(document),
    };

    let current = parsed.query_pairs()
        .find(|(name, _)| name == PAGE_POINTER_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_POINTER.to_string());

    /*
     * 項目一覧の探索
     */
    let items = non_empty_array(document.get("pageList"))
        .or_else(|| {
            COLLECTION_PATHS.iter()
                .find_map(|path| non_empty_array(lookup(document, path)))
        });

    let pages = match items {
        Some(items) => {
            let doc_oid = pointer_of(document.get("oid"));
            items.iter()
                .enumerate()
                .map(|(index, item)| LooseItem {
                    item,
                    index,
                    key,
                    url,
                    parsed: &parsed,
                    doc_oid: doc_oid.as_deref(),
                    current: &current,
                    content: &content,
                    book_name: &book_name,
                }.into_page())
                .collect()
        }

        None => {
            vec![
                PageInfo::new(key, &current, &book_name, &book_name)
                    .with_state(Some(DEFAULT_STATE.to_string()))
                    .with_url(Some(url.to_string()))
                    .with_content(content),
            ]
        }
    };

    Ok(AssembledDocument {
        pages: dedupe_codes(pages, key),
        book_name,
    })
}

///
/// 緩い構造の文書の1項目
///
struct LooseItem<'a> {
    item: &'a Value,
    index: usize,
    key: &'a str,
    url: &'a str,
    parsed: &'a Url,
    doc_oid: Option<&'a str>,
    current: &'a str,
    content: &'a str,
    book_name: &'a str,
}

impl LooseItem<'_> {
    ///
    /// 項目をページ情報に変換する
    ///
    fn into_page(self) -> PageInfo {
        let item = self.item;
        let pointer = pointer_of(item.get("pageOid"))
            .or_else(|| pointer_of(item.get("oid")))
            .or_else(|| pointer_of(item.get("id")));

        let name = ["name", "title", "label"].iter()
            .find_map(|field| non_empty_str(item.get(*field)))
            .unwrap_or(UNNAMED_ITEM);

        let state = non_empty_str(item.get("state"))
            .unwrap_or(DEFAULT_STATE);

        /*
         * 項目URLの生成
         */
        let url = match &pointer {
            Some(pointer) => {
                let mut url = self.parsed.clone();
                set_query_param(&mut url, PAGE_POINTER_PARAM, pointer);
                if let Some(oid) = self.doc_oid {
                    if !url.query_pairs().any(|(name, _)| name == "oid") {
                        set_query_param(&mut url, "oid", oid);
                    }
                }
                url.to_string()
            }

            None => self.url.to_string(),
        };

        let is_current = pointer.as_deref() == Some(self.current);
        let content = if is_current {
            self.content.to_string()
        } else {
            String::new()
        };

        let code = pointer.unwrap_or_else(|| {
            format!("mngkit-{}-item-{}", self.key, self.index)
        });

        PageInfo::new(self.key, code, name, self.book_name)
            .with_state(Some(state.to_string()))
            .with_url(Some(url))
            .with_content(content)
    }
}

///
/// クエリパラメータの設定
///
/// # 注記
/// 同名のパラメータが存在する場合は最初の1つを置き換えて残りを取り除く。存
/// 在しない場合は末尾に追加する。
///
fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;

    for (key, current) in url.query_pairs() {
        if key == name {
            if !replaced {
                pairs.push((key.into_owned(), value.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), current.into_owned()));
        }
    }

    if !replaced {
        pairs.push((name.to_string(), value.to_string()));
    }

    replace_query(url, &pairs);
}

///
/// 重複コードの除去
///
/// # 注記
/// 最初に現れたページを残し、以降のページは警告を出して取り除く。
///
fn dedupe_codes(pages: Vec<PageInfo>, key: &str) -> Vec<PageInfo> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(pages.len());

    for page in pages {
        if seen.insert(page.code().to_string()) {
            result.push(page);
        } else {
            warn!("duplicate page code dropped: {} in {}", page.code(), key);
        }
    }

    result
}

///
/// ペイロードの必須要素の取得
///
pub(crate) fn require_str<'a>(payload: &'a Value, field: &str)
    -> Result<&'a str>
{
    non_empty_str(payload.get(field))
        .ok_or_else(|| anyhow!("payload has no {}", field))
}

fn localized(text: &LocalizedText, lang: &str) -> String {
    text.get(lang)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, field| node.get(*field))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|text| !text.is_empty())
}

fn non_empty_array(value: Option<&Value>) -> Option<&Vec<Value>> {
    value.and_then(Value::as_array).filter(|items| !items.is_empty())
}

///
/// ページ位置として使用できる値の文字列化
///
fn pointer_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(num) if num.as_f64() != Some(0.0) => {
            Some(num.to_string())
        }
        _ => None,
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(num) => num.as_f64() != Some(0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
