/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! データベースに格納するレコード型の定義
//!

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{anyhow, Error};
use chrono::{DateTime, Duration, Local};
use redb::{Key, TypeName, Value};
use serde::{Deserialize, Serialize};

///
/// ページIDを表す構造体
///
/// # 注記
/// ストアが払い出す連番をラップする。キーとしてはビッグエンディアンのバイト列
/// で格納するため、バイト列比較の順序と数値の順序が一致する。
///
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct PageId(u64);

impl PageId {
    ///
    /// ページIDオブジェクトの生成
    ///
    /// # 引数
    /// * `value` - ID値
    ///
    /// # 戻り値
    /// 生成したオブジェクトを返す。
    ///
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    ///
    /// ID値へのアクセサ
    ///
    pub fn value(&self) -> u64 {
        self.0
    }
}

// Fromトレイトの実装
impl From<u64> for PageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// FromStrトレイトの実装
impl FromStr for PageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(value) => Ok(Self(value)),
            Err(_) => Err(anyhow!("invalid page id: {}", s)),
        }
    }
}

// Displayトレイトの実装
impl Display for PageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Valueトレイトの実装
impl Value for PageId {
    type SelfType<'a> = PageId;
    type AsBytes<'a> = [u8; 8];

    fn fixed_width() -> Option<usize> {
        Some(8)
    }

    fn type_name() -> TypeName {
        TypeName::new("PageId")
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b
    {
        value.0.to_be_bytes()
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a
    {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(data);

        Self(u64::from_be_bytes(bytes))
    }
}

// Keyトレイトの実装
impl Key for PageId {
    fn compare(a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

///
/// パンくずリストの1要素
///
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Breadcrumb {
    /// 祖先ページのコード
    code: String,

    /// 祖先ページの名前
    name: String,
}

impl Breadcrumb {
    ///
    /// パンくず要素の生成
    ///
    /// # 引数
    /// * `code` - ページコード
    /// * `name` - ページ名
    ///
    /// # 戻り値
    /// 生成したオブジェクトを返す。
    ///
    pub fn new<C, N>(code: C, name: N) -> Self
    where
        C: AsRef<str>,
        N: AsRef<str>,
    {
        Self {
            code: code.as_ref().to_string(),
            name: name.as_ref().to_string(),
        }
    }

    ///
    /// ページコードへのアクセサ
    ///
    pub fn code(&self) -> &str {
        &self.code
    }

    ///
    /// ページ名へのアクセサ
    ///
    pub fn name(&self) -> &str {
        &self.name
    }
}

///
/// ブック情報
///
/// # 注記
/// ドキュメントキー毎に1件だけ存在する。インデックス処理で作成され、期限切れ
/// 後の再インデックス時のみ最終更新日時が更新される。
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInfo {
    /// ドキュメントキー
    document_key: String,

    /// ブック名
    name: String,

    /// 最終更新日時
    last_update: DateTime<Local>,
}

impl BookInfo {
    ///
    /// ブック情報の生成
    ///
    /// # 引数
    /// * `document_key` - ドキュメントキー
    /// * `name` - ブック名
    /// * `last_update` - 最終更新日時
    ///
    /// # 戻り値
    /// 生成したオブジェクトを返す。
    ///
    pub fn new<K, N>(document_key: K, name: N, last_update: DateTime<Local>)
        -> Self
    where
        K: AsRef<str>,
        N: AsRef<str>,
    {
        Self {
            document_key: document_key.as_ref().to_string(),
            name: name.as_ref().to_string(),
            last_update,
        }
    }

    ///
    /// ドキュメントキーへのアクセサ
    ///
    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    ///
    /// ブック名へのアクセサ
    ///
    pub fn name(&self) -> &str {
        &self.name
    }

    ///
    /// 最終更新日時へのアクセサ
    ///
    pub fn last_update(&self) -> DateTime<Local> {
        self.last_update
    }

    ///
    /// 最終更新日時の更新
    ///
    /// # 引数
    /// * `last_update` - 新しい最終更新日時
    ///
    pub fn set_last_update(&mut self, last_update: DateTime<Local>) {
        self.last_update = last_update;
    }

    ///
    /// インデックスが有効期限内か否かの判定
    ///
    /// # 引数
    /// * `now` - 判定基準の現在日時
    /// * `expiration` - 有効期間
    ///
    /// # 戻り値
    /// 最終更新日時が`now - expiration`より新しい場合は`true`を返す。
    ///
    pub fn is_fresh(&self, now: DateTime<Local>, expiration: Duration) -> bool {
        self.last_update > now - expiration
    }
}

// Valueトレイトの実装
impl Value for BookInfo {
    type SelfType<'a> = BookInfo;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn type_name() -> TypeName {
        TypeName::new("BookInfo")
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a
    {
        rmp_serde::from_slice::<Self>(data)
            .expect("invalid MessagePack packed bytes")
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b
    {
        rmp_serde::to_vec_named(value)
            .expect("failed to serialize to MessagePack bytes")
    }
}

///
/// ページ情報
///
/// # 注記
/// IDはストアへの登録時に払い出されるため、登録前のページでは`None`となる。
/// (ドキュメントキー, コード)の組はストア内で一意。
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// ページID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<PageId>,

    /// 所属ブックのストアキー
    book_id: String,

    /// ドキュメントキー
    document_key: String,

    /// ソース側のページコード
    code: String,

    /// ページ名
    name: String,

    /// ブック名
    book_name: String,

    /// パンくずリスト
    #[serde(default)]
    breadcrumbs: Vec<Breadcrumb>,

    /// テーマカラー
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,

    /// ソース側のライフサイクル状態
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,

    /// 抽出済み本文テキスト
    #[serde(default)]
    content: String,

    /// ページURL(緩い構造のソースのみ)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl PageInfo {
    ///
    /// 未登録ページ情報の生成
    ///
    /// # 引数
    /// * `document_key` - ドキュメントキー(所属ブックのキーを兼ねる)
    /// * `code` - ページコード
    /// * `name` - ページ名
    /// * `book_name` - ブック名
    ///
    /// # 戻り値
    /// ID未割り当てのページ情報を返す。
    ///
    pub fn new<K, C, N, B>(document_key: K, code: C, name: N, book_name: B)
        -> Self
    where
        K: AsRef<str>,
        C: AsRef<str>,
        N: AsRef<str>,
        B: AsRef<str>,
    {
        Self {
            id: None,
            book_id: document_key.as_ref().to_string(),
            document_key: document_key.as_ref().to_string(),
            code: code.as_ref().to_string(),
            name: name.as_ref().to_string(),
            book_name: book_name.as_ref().to_string(),
            breadcrumbs: Vec::new(),
            color: None,
            state: None,
            content: String::new(),
            url: None,
        }
    }

    pub fn with_breadcrumbs(mut self, breadcrumbs: Vec<Breadcrumb>) -> Self {
        self.breadcrumbs = breadcrumbs;
        self
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    pub fn with_state(mut self, state: Option<String>) -> Self {
        self.state = state;
        self
    }

    pub fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    ///
    /// ID割り当て済みのページ情報を生成
    ///
    pub(crate) fn with_id(mut self, id: PageId) -> Self {
        self.id = Some(id);
        self
    }

    ///
    /// IDを取り除いたページ情報を生成
    ///
    /// # 注記
    /// インポート時にIDを振り直すために使用する。
    ///
    pub(crate) fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    ///
    /// ページIDへのアクセサ
    ///
    pub fn id(&self) -> Option<PageId> {
        self.id
    }

    ///
    /// 所属ブックIDへのアクセサ
    ///
    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    ///
    /// ドキュメントキーへのアクセサ
    ///
    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    ///
    /// ページコードへのアクセサ
    ///
    pub fn code(&self) -> &str {
        &self.code
    }

    ///
    /// ページ名へのアクセサ
    ///
    pub fn name(&self) -> &str {
        &self.name
    }

    ///
    /// ブック名へのアクセサ
    ///
    pub fn book_name(&self) -> &str {
        &self.book_name
    }

    ///
    /// パンくずリストへのアクセサ
    ///
    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        &self.breadcrumbs
    }

    ///
    /// テーマカラーへのアクセサ
    ///
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    ///
    /// 状態へのアクセサ
    ///
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    ///
    /// 本文テキストへのアクセサ
    ///
    pub fn content(&self) -> &str {
        &self.content
    }

    ///
    /// ページURLへのアクセサ
    ///
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    ///
    /// 差分計算用の同値判定
    ///
    /// # 引数
    /// * `other` - 比較対象のページ
    ///
    /// # 戻り値
    /// コード、ページ名、ブック名、状態が全て一致する場合は`true`を返す。
    ///
    /// # 注記
    /// IDと本文テキストは比較対象に含めない。
    ///
    pub fn is_equivalent(&self, other: &PageInfo) -> bool {
        self.code == other.code
            && self.name == other.name
            && self.book_name == other.book_name
            && self.state == other.state
    }
}

// Valueトレイトの実装
impl Value for PageInfo {
    type SelfType<'a> = PageInfo;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn type_name() -> TypeName {
        TypeName::new("PageInfo")
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a
    {
        rmp_serde::from_slice::<Self>(data)
            .expect("invalid MessagePack packed bytes")
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b
    {
        rmp_serde::to_vec_named(value)
            .expect("failed to serialize to MessagePack bytes")
    }
}

///
/// 転置インデックスのダンプを保持するレコード
///
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IndexDump {
    /// レコードID(常に1)
    id: u64,

    /// シリアライズ済みのインデックス
    index_dump: String,
}

impl IndexDump {
    ///
    /// ダンプレコードの生成
    ///
    pub(crate) fn new(id: u64, index_dump: String) -> Self {
        Self { id, index_dump }
    }

    ///
    /// ダンプ文字列の取り出し
    ///
    pub(crate) fn into_dump(self) -> String {
        self.index_dump
    }
}

// Valueトレイトの実装
impl Value for IndexDump {
    type SelfType<'a> = IndexDump;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn type_name() -> TypeName {
        TypeName::new("IndexDump")
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a
    {
        rmp_serde::from_slice::<Self>(data)
            .expect("invalid MessagePack packed bytes")
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b
    {
        rmp_serde::to_vec_named(value)
            .expect("failed to serialize to MessagePack bytes")
    }
}
