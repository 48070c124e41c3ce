/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 全文検索関連処理をまとめたモジュール
//!

mod tokenizer;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::database::types::{PageId, PageInfo};
use tokenizer::tokenize;

/// ダンプ形式のバージョン
const INDEX_FORMAT_VERSION: u32 = 1;

///
/// インデックス対象のフィールド種別
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FtsField {
    /// ページ名
    Name,

    /// ブック名
    BookName,

    /// 本文テキスト
    Content,
}

impl FtsField {
    /// 全フィールド
    pub const ALL: [FtsField; 3] =
        [FtsField::Name, FtsField::BookName, FtsField::Content];
}

///
/// インデックスに登録するページ単位の文書
///
#[derive(Clone, Debug, Default)]
pub struct FtsDocument {
    name: String,
    book_name: String,
    content: String,
}

impl FtsDocument {
    ///
    /// 文書情報の生成
    ///
    /// # 引数
    /// * `name` - ページ名
    /// * `book_name` - ブック名
    /// * `content` - 本文テキスト
    ///
    /// # 戻り値
    /// 生成した文書情報
    ///
    pub fn new<N, B, C>(name: N, book_name: B, content: C) -> Self
    where
        N: AsRef<str>,
        B: AsRef<str>,
        C: AsRef<str>,
    {
        Self {
            name: name.as_ref().to_string(),
            book_name: book_name.as_ref().to_string(),
            content: content.as_ref().to_string(),
        }
    }

    ///
    /// ページ情報から文書情報を生成
    ///
    pub fn from_page(page: &PageInfo) -> Self {
        Self::new(page.name(), page.book_name(), page.content())
    }

    ///
    /// フィールド値の取得
    ///
    fn field(&self, field: FtsField) -> &str {
        match field {
            FtsField::Name => &self.name,
            FtsField::BookName => &self.book_name,
            FtsField::Content => &self.content,
        }
    }
}

///
/// 全文検索結果の1件
///
#[derive(Clone, Debug, PartialEq)]
pub struct FtsSearchResult {
    page_id: PageId,
    score: f64,
}

impl FtsSearchResult {
    ///
    /// ページIDへのアクセサ
    ///
    /// # 戻り値
    /// ページID
    ///
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    ///
    /// スコアへのアクセサ
    ///
    /// # 戻り値
    /// 検索スコア
    ///
    pub fn score(&self) -> f64 {
        self.score
    }
}

///
/// 1文書の1フィールド分の登録情報
///
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct FieldEntry {
    /// フィールドのターム数
    length: usize,

    /// 出現したターム(重複なし)
    terms: Vec<String>,
}

///
/// フィールド単位の転置インデックス
///
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct FieldIndex {
    /// ターム => (文書ID => 出現回数)
    postings: BTreeMap<String, BTreeMap<u64, u32>>,

    /// 文書ID => 登録情報
    entries: BTreeMap<u64, FieldEntry>,
}

impl FieldIndex {
    ///
    /// 文書の登録
    ///
    fn add(&mut self, doc_id: u64, text: &str) {
        let terms = tokenize(text);

        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for term in &terms {
            *counts.entry(term.clone()).or_default() += 1;
        }

        for (term, count) in &counts {
            self.postings.entry(term.clone())
                .or_default()
                .insert(doc_id, *count);
        }

        self.entries.insert(doc_id, FieldEntry {
            length: terms.len(),
            terms: counts.into_keys().collect(),
        });
    }

    ///
    /// 文書の削除
    ///
    fn remove(&mut self, doc_id: u64) {
        let Some(entry) = self.entries.remove(&doc_id) else {
            return;
        };

        for term in entry.terms {
            if let Some(docs) = self.postings.get_mut(&term) {
                docs.remove(&doc_id);
                if docs.is_empty() {
                    self.postings.remove(&term);
                }
            }
        }
    }

    ///
    /// フィールド単位のスコア計算
    ///
    /// # 引数
    /// * `tokens` - クエリのターム列
    /// * `expand` - 前方一致展開の有無
    /// * `doc_count` - インデックス内の文書数
    ///
    /// # 戻り値
    /// 文書ID => スコア(協調係数適用済み)
    ///
    fn score(&self, tokens: &[String], expand: bool, doc_count: usize)
        -> BTreeMap<u64, f64>
    {
        let mut scores: BTreeMap<u64, f64> = BTreeMap::new();
        let mut matched: BTreeMap<u64, usize> = BTreeMap::new();

        for token in tokens {
            let mut hit_docs = BTreeSet::new();

            for (term, docs) in self.matching_terms(token, expand) {
                let penalty = if term == token {
                    1.0
                } else {
                    let diff = term.chars().count()
                        .saturating_sub(token.chars().count());
                    1.0 / (diff.max(3) as f64).ln()
                };

                let idf = 1.0
                    + (doc_count as f64 / (docs.len() as f64 + 1.0)).ln();

                for (doc_id, tf) in docs {
                    let length = self.entries.get(doc_id)
                        .map(|entry| entry.length)
                        .unwrap_or(1)
                        .max(1);
                    let value = penalty * (*tf as f64).sqrt() * idf
                        / (length as f64).sqrt();

                    *scores.entry(*doc_id).or_default() += value;
                    hit_docs.insert(*doc_id);
                }
            }

            for doc_id in hit_docs {
                *matched.entry(doc_id).or_default() += 1;
            }
        }

        /*
         * 協調係数の適用
         */
        for (doc_id, score) in scores.iter_mut() {
            let hits = matched.get(doc_id).copied().unwrap_or(0);
            *score *= hits as f64 / tokens.len() as f64;
        }

        scores
    }

    ///
    /// クエリタームに一致するインデックスタームの列挙
    ///
    fn matching_terms<'a>(&'a self, token: &'a str, expand: bool)
        -> Box<dyn Iterator<Item = (&'a String, &'a BTreeMap<u64, u32>)> + 'a>
    {
        if expand {
            Box::new(
                self.postings.range(token.to_string()..)
                    .take_while(move |(term, _)| term.starts_with(token))
            )
        } else {
            Box::new(self.postings.get_key_value(token).into_iter())
        }
    }
}

///
/// 全文検索インデックス
///
/// # 概要
/// ページ名、ブック名、本文テキストの3フィールドを持つ転置インデックス。文書
/// はページIDで識別する。インデックス全体を1つのJSON文字列に直列化して保存
/// する。
///
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    version: u32,
    documents: BTreeSet<u64>,
    name: FieldIndex,
    book_name: FieldIndex,
    content: FieldIndex,
}

impl SearchIndex {
    ///
    /// 空のインデックスの生成
    ///
    pub fn new() -> Self {
        Self {
            version: INDEX_FORMAT_VERSION,
            documents: BTreeSet::new(),
            name: FieldIndex::default(),
            book_name: FieldIndex::default(),
            content: FieldIndex::default(),
        }
    }

    ///
    /// ダンプからのインデックス復元
    ///
    /// # 引数
    /// * `dump` - [`SearchIndex::serialize`]で生成した文字列
    ///
    /// # 戻り値
    /// 復元したインデックスを`Ok()`でラップして返す。形式が不正な場合はエラー
    /// 情報を`Err()`でラップして返す。
    ///
    pub fn load(dump: &str) -> Result<Self> {
        let index: Self = serde_json::from_str(dump)
            .context("parse index dump")?;

        if index.version != INDEX_FORMAT_VERSION {
            return Err(anyhow!(
                "unsupported index dump version: {}",
                index.version
            ));
        }

        Ok(index)
    }

    ///
    /// インデックスの直列化
    ///
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    ///
    /// 登録文書数
    ///
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    ///
    /// 文書が登録済みか否か
    ///
    pub fn contains(&self, page_id: PageId) -> bool {
        self.documents.contains(&page_id.value())
    }

    ///
    /// 文書の登録
    ///
    /// # 引数
    /// * `page_id` - 文書を識別するページID
    /// * `doc` - 登録する文書
    ///
    /// # 注記
    /// 登録済みのページIDを指定した場合は内容を置き換える。
    ///
    pub fn add_doc(&mut self, page_id: PageId, doc: &FtsDocument) {
        let doc_id = page_id.value();
        if self.documents.contains(&doc_id) {
            self.remove_doc(page_id);
        }

        for field in FtsField::ALL {
            self.field_mut(field).add(doc_id, doc.field(field));
        }

        self.documents.insert(doc_id);
    }

    ///
    /// 文書の削除
    ///
    /// # 戻り値
    /// 登録されていた場合は`true`を返す。
    ///
    pub fn remove_doc(&mut self, page_id: PageId) -> bool {
        let doc_id = page_id.value();
        if !self.documents.remove(&doc_id) {
            return false;
        }

        for field in FtsField::ALL {
            self.field_mut(field).remove(doc_id);
        }

        true
    }

    ///
    /// 検索の実行
    ///
    /// # 引数
    /// * `query` - クエリ文字列
    /// * `expand` - 前方一致によるターム展開の有無
    ///
    /// # 戻り値
    /// スコアの降順(同点はページIDの昇順)に並べた検索結果を返す。
    ///
    pub fn search(&self, query: &str, expand: bool) -> Vec<FtsSearchResult> {
        let tokens = tokenize(query);
        if tokens.is_empty() || self.documents.is_empty() {
            return Vec::new();
        }

        let doc_count = self.documents.len();
        let mut totals: BTreeMap<u64, f64> = BTreeMap::new();

        for field in FtsField::ALL {
            let scores = self.field(field).score(&tokens, expand, doc_count);
            for (doc_id, score) in scores {
                *totals.entry(doc_id).or_default() += score;
            }
        }

        let mut results: Vec<FtsSearchResult> = totals.into_iter()
            .filter(|(_, score)| *score > 0.0)
            .map(|(doc_id, score)| FtsSearchResult {
                page_id: PageId::new(doc_id),
                score,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score.partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.page_id.cmp(&b.page_id))
        });

        results
    }

    fn field(&self, field: FtsField) -> &FieldIndex {
        match field {
            FtsField::Name => &self.name,
            FtsField::BookName => &self.book_name,
            FtsField::Content => &self.content,
        }
    }

    fn field_mut(&mut self, field: FtsField) -> &mut FieldIndex {
        match field {
            FtsField::Name => &mut self.name,
            FtsField::BookName => &mut self.book_name,
            FtsField::Content => &mut self.content,
        }
    }
}

// Defaultトレイトの実装
impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> SearchIndex {
        let mut index = SearchIndex::new();
        index.add_doc(
            PageId::new(1),
            &FtsDocument::new("UU5.Bricks.Accordion", "Widgets", ""),
        );
        index.add_doc(
            PageId::new(2),
            &FtsDocument::new("Release notes", "Handbook", "accordion fixes"),
        );
        index.add_doc(
            PageId::new(3),
            &FtsDocument::new("Installation", "Handbook", "install the tool"),
        );
        index
    }

    fn ids(results: &[FtsSearchResult]) -> Vec<u64> {
        results.iter().map(|result| result.page_id().value()).collect()
    }

    #[test]
    fn dotted_name_is_found_by_subterm() {
        let index = sample_index();
        let mut found = ids(&index.search("accordion", true));
        found.sort();
        assert_eq!(found, vec![1, 2]);
    }

    #[test]
    fn prefix_expansion_only_when_requested() {
        let index = sample_index();
        assert_eq!(ids(&index.search("instal", true)), vec![3]);
        assert!(index.search("instal", false).is_empty());
    }

    #[test]
    fn removed_document_is_no_longer_found() {
        let mut index = sample_index();
        assert!(index.remove_doc(PageId::new(1)));
        assert!(!index.remove_doc(PageId::new(1)));
        assert_eq!(ids(&index.search("accordion", true)), vec![2]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn equal_scores_are_ordered_by_id() {
        let mut index = SearchIndex::new();
        index.add_doc(PageId::new(9), &FtsDocument::new("guide", "B", ""));
        index.add_doc(PageId::new(4), &FtsDocument::new("guide", "B", ""));
        assert_eq!(ids(&index.search("guide", true)), vec![4, 9]);
    }

    #[test]
    fn stop_word_query_returns_nothing() {
        let index = sample_index();
        assert!(index.search("the", true).is_empty());
        assert!(index.search("   ", true).is_empty());
    }

    #[test]
    fn reloaded_index_answers_identically() {
        let index = sample_index();
        let dump = index.serialize().expect("serialize failed");
        let loaded = SearchIndex::load(&dump).expect("load failed");

        for query in ["accordion", "handbook", "notes install"] {
            assert_eq!(index.search(query, true), loaded.search(query, true));
        }
    }

    #[test]
    fn malformed_dump_is_rejected() {
        assert!(SearchIndex::load("not json").is_err());
    }
}
