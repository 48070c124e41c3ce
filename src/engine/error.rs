/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! エンジン操作で使用するエラー種別を定義するモジュール
//!

///
/// エンジン操作で使用するエラー種別
///
#[derive(Debug)]
pub enum EngineError {
    /// URLからドキュメントキーを導出できない
    UrlResolution(String),

    /// ストアのトランザクションが失敗した
    StoreTransaction(String),

    /// インデックスが初期化されていない
    IndexNotInitialized,

    /// インポートデータの形式が不正
    ImportFormat(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::UrlResolution(url) => {
                write!(f, "cannot resolve document key from url: {}", url)
            }
            EngineError::StoreTransaction(msg) => {
                write!(f, "store transaction failed: {}", msg)
            }
            EngineError::IndexNotInitialized => {
                write!(f, "search index is not initialized")
            }
            EngineError::ImportFormat(msg) => {
                write!(f, "invalid import data: {}", msg)
            }
        }
    }
}

impl std::error::Error for EngineError {}
