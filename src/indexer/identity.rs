/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ページURLからドキュメントキーを導出するモジュール
//!

use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::warn;
use regex::Regex;
use url::Url;

use crate::engine::EngineError;
use super::DocumentKind;

/// ブック形式のページURL
static BOOK_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"https://[a-zA-Z0-9]+\.plus4u.net/",
        r"(uu-dockitg01-main|uu-bookkit-maing01|uu-bookkitg01-main)/",
        r"([a-z0-9]+-)?([a-z0-9]+)",
    )).expect("valid book url regex")
});

/// 16進表記のドキュメントOID
static HEX_OID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-f0-9]+$").expect("valid oid regex")
});

/// 管理文書形式のパステンプレート(優先順)
static MANAGEMENT_PATHS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        concat!(
            r"https://[a-zA-Z0-9.-]+\.plus4u.net/",
            r"uu-managementkit-maing[0-9]+/([a-z0-9]+-)?([a-z0-9]+)",
        ),
        concat!(
            r"https://[a-zA-Z0-9.-]+/",
            r"uu-managementkit-maing[0-9]+/([a-z0-9]+-)?([a-z0-9]+)",
        ),
        r"uu-managementkit-maing[0-9]+/([a-z0-9]+-)?([a-z0-9]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid management url regex"))
    .collect()
});

/// URL由来の代替キーのプレフィックス
const FALLBACK_PREFIX: &str = "mngkit-";

/// URL解析失敗時の代替キーのプレフィックス
const ERROR_PREFIX: &str = "mngkit-err-";

/// ページ位置を示すクエリパラメータ名
pub(crate) const PAGE_POINTER_PARAM: &str = "pageOid";

///
/// ドキュメントキーの導出
///
/// # 引数
/// * `url` - ページURL
/// * `kind` - ソースの種別
///
/// # 戻り値
/// 導出したドキュメントキーを`Ok()`でラップして返す。ブック形式でURLが規定
/// のパターンに一致しない場合は`EngineError::UrlResolution`を返す。
///
pub fn resolve_document_key(url: &str, kind: DocumentKind) -> Result<String> {
    match kind {
        DocumentKind::Structured => resolve_book_key(url),
        DocumentKind::Loose => Ok(resolve_management_key(url)),
    }
}

///
/// ブック形式のドキュメントキー導出
///
fn resolve_book_key(url: &str) -> Result<String> {
    BOOK_URL.captures(url)
        .and_then(|caps| caps.get(3))
        .map(|key| key.as_str().to_string())
        .ok_or_else(|| anyhow!(EngineError::UrlResolution(url.to_string())))
}

///
/// 管理文書形式のドキュメントキー導出
///
/// # 概要
/// 以下の順で導出を試みる。
///
///  1. クエリパラメータ`oid`が16進表記であればその値
///  2. パステンプレートに一致した場合は末尾のキャプチャ
///  3. `pageOid`を除いたパスとクエリから生成した代替キー
///
/// URL自体の解析に失敗した場合はURL文字列全体から代替キーを生成する。
///
fn resolve_management_key(raw: &str) -> String {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(err) => {
            warn!("failed to parse document url {}: {}", raw, err);
            return format!("{}{}", ERROR_PREFIX, encode_fragment(raw, 15));
        }
    };

    /*
     * ドキュメントOID
     */
    let oid = url.query_pairs()
        .find(|(name, _)| name == "oid")
        .map(|(_, value)| value.into_owned());

    if let Some(oid) = oid {
        if HEX_OID.is_match(&oid) {
            return oid;
        }
    }

    /*
     * パステンプレート
     */
    for pattern in MANAGEMENT_PATHS.iter() {
        if let Some(caps) = pattern.captures(raw) {
            if let Some(key) = caps.get(caps.len() - 1) {
                return key.as_str().to_string();
            }
        }
    }

    /*
     * URL由来の代替キー
     */
    let mut url = url;
    let remaining: Vec<(String, String)> = url.query_pairs()
        .filter(|(name, _)| name != PAGE_POINTER_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    replace_query(&mut url, &remaining);

    let source = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    format!("{}{}", FALLBACK_PREFIX, encode_fragment(&source, 20))
}

///
/// クエリパラメータの置き換え
///
/// # 注記
/// パラメータが空の場合はクエリ自体を取り除く。
///
pub(crate) fn replace_query(url: &mut Url, pairs: &[(String, String)]) {
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

///
/// 文字列をBase64化し英数字のみを先頭から指定長だけ取り出す
///
fn encode_fragment(source: &str, length: usize) -> String {
    STANDARD.encode(source.as_bytes())
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .take(length)
        .collect()
}
