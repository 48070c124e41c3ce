/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 全文検索用トークナイザを提供するモジュール
//!

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// トークンの区切り(空白、ハイフン、ドット、スラッシュ)
static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\-./]+").expect("valid separator regex")
});

/// トークン前後の非単語文字
static TRIMMER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\W+|\W+$").expect("valid trimmer regex")
});

/// 英語ステマー
static STEMMER: LazyLock<Stemmer> = LazyLock::new(|| {
    Stemmer::create(Algorithm::English)
});

/// 英語ストップワード
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let words: &[&str] = &[
        "a", "able", "about", "across", "after", "all", "almost", "also", "am",
        "among", "an", "and", "any", "are", "as", "at", "be", "because",
        "been", "but", "by", "can", "cannot", "could", "dear", "did", "do",
        "does", "either", "else", "ever", "every", "for", "from", "get",
        "got", "had", "has", "have", "he", "her", "hers", "him", "his", "how",
        "however", "i", "if", "in", "into", "is", "it", "its", "just",
        "least", "let", "like", "likely", "may", "me", "might", "most",
        "must", "my", "neither", "no", "nor", "not", "of", "off", "often",
        "on", "only", "or", "other", "our", "own", "rather", "said", "say",
        "says", "she", "should", "since", "so", "some", "than", "that", "the",
        "their", "them", "then", "there", "these", "they", "this", "tis",
        "to", "too", "twas", "us", "wants", "was", "we", "were", "what",
        "when", "where", "which", "while", "who", "whom", "why", "will",
        "with", "would", "yet", "you", "your",
    ];
    words.iter().copied().collect()
});

///
/// テキストを検索用のタームに分解する
///
/// # 概要
/// 区切り文字で分割し、小文字化と前後の非単語文字の除去を行った上で、ストッ
/// プワードを取り除き、語幹化したタームを返す。
///
/// # 引数
/// * `text` - 解析対象テキスト
///
/// # 戻り値
/// 出現順のターム列
///
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut terms = Vec::new();

    for raw in SEPARATOR.split(&lowered) {
        let token = TRIMMER.replace_all(raw, "");
        if token.is_empty() || STOPWORDS.contains(token.as_ref()) {
            continue;
        }

        let term = STEMMER.stem(&token);
        if !term.is_empty() {
            terms.push(term.into_owned());
        }
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_identifier_splits_into_subterms() {
        let terms = tokenize("UU5.Bricks.Accordion");
        assert_eq!(terms, vec!["uu5", "brick", "accordion"]);
    }

    #[test]
    fn separators_and_punctuation_are_dropped() {
        let terms = tokenize("  (Release)-notes / v2.0 ");
        assert_eq!(terms, vec!["releas", "note", "v2", "0"]);
    }

    #[test]
    fn stop_words_are_removed() {
        assert!(tokenize("the and of").is_empty());
        assert_eq!(tokenize("Running the tests"), vec!["run", "test"]);
    }
}
