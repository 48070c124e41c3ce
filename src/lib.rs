/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//! ライブラリ用の公開モジュール定義
#![allow(dead_code)]

pub mod database;
pub mod engine;
pub mod fts;
pub mod indexer;
