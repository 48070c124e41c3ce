/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 取得した文書データをページ情報に正規化する処理をまとめたモジュール
//!

pub mod assemble;
pub mod diff;
pub mod extract;
pub mod identity;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{anyhow, Error};

pub use assemble::{assemble_loose, assemble_structured, AssembledDocument};
pub use diff::{get_patch, split_patch, PatchOp};
pub use extract::extract_text;
pub use identity::resolve_document_key;

///
/// 文書ソースの種別
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentKind {
    /// メニューと構造情報を持つブック
    Structured,

    /// 緩い構造の管理文書
    Loose,
}

// FromStrトレイトの実装
impl FromStr for DocumentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(Self::Structured),
            "loose" => Ok(Self::Loose),
            _ => Err(anyhow!("unknown document kind: {}", s)),
        }
    }
}

// Displayトレイトの実装
impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::Loose => write!(f, "loose"),
        }
    }
}
