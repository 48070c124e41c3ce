/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! データベース関連処理をまとめたモジュール
//!

mod init;
mod manager;
mod schema;
mod txn_helpers;
pub mod types;

#[cfg(test)]
mod tests;

pub use manager::{DatabaseManager, StoreWriter};
pub use schema::DbError;
