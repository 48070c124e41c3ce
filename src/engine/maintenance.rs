/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ページとブックの削除操作を実装するモジュール
//!

use anyhow::Result;
use log::info;

use crate::database::types::{PageId, PageInfo};
use crate::fts::SearchIndex;
use super::{into_store_error, run_blocking, Engine};

impl Engine {
    ///
    /// ページの削除
    ///
    /// # 引数
    /// * `id` - 削除するページのID
    ///
    /// # 戻り値
    /// 削除したページ情報を`Ok(Some())`でラップして返す。ページが存在しない
    /// 場合は`Ok(None)`を返す。
    ///
    /// # 注記
    /// 削除によって同じドキュメントキーのページが無くなった場合はブックも削
    /// 除する。
    ///
    pub async fn delete_page(&self, id: PageId) -> Result<Option<PageInfo>> {
        self.ensure_index()?;
        let engine = self.clone();

        run_blocking(move || {
            let _writer = engine.lock_index_writer()?;
            let mut index = engine.snapshot_index()?;

            let deleted = engine.db.write(|writer| {
                let Some(page) = writer.delete_page(id)? else {
                    return Ok(None);
                };

                index.remove_doc(id);
                if !writer.has_pages(page.document_key())? {
                    writer.delete_book(page.document_key())?;
                    info!("book {} has no pages, deleted", page.document_key());
                }

                writer.put_index_dump(index.serialize()?)?;
                Ok(Some(page))
            }).map_err(into_store_error)?;

            if deleted.is_some() {
                engine.publish_index(index)?;
            }

            Ok(deleted)
        }).await
    }

    ///
    /// ブックの削除
    ///
    /// # 引数
    /// * `key` - 削除するブックのドキュメントキー
    ///
    /// # 戻り値
    /// ブックかページが存在した場合は削除したページ数を`Ok(Some())`でラップ
    /// して返す。どちらも存在しない場合は`Ok(None)`を返す。
    ///
    pub async fn delete_book(&self, key: &str) -> Result<Option<usize>> {
        self.ensure_index()?;

        let _guard = self.locks.lock(key).await?;
        let engine = self.clone();
        let key = key.to_string();

        run_blocking(move || {
            let _writer = engine.lock_index_writer()?;
            let mut index = engine.snapshot_index()?;

            let deleted = engine.db.write(|writer| {
                let book = writer.delete_book(&key)?;
                let pages = writer.delete_pages_by_key(&key)?;

                if book.is_none() && pages.is_empty() {
                    return Ok(None);
                }

                for page in &pages {
                    if let Some(id) = page.id() {
                        index.remove_doc(id);
                    }
                }

                writer.put_index_dump(index.serialize()?)?;
                Ok(Some(pages.len()))
            }).map_err(into_store_error)?;

            if let Some(count) = deleted {
                engine.publish_index(index)?;
                info!("deleted book {} with {} pages", key, count);
            }

            Ok(deleted)
        }).await
    }

    ///
    /// 全レコードの削除
    ///
    /// # 注記
    /// 全てのブックとページを削除し、空のインデックスを保存する。ページIDの
    /// 払い出し状態は維持する。
    ///
    pub async fn clear_all(&self) -> Result<()> {
        let engine = self.clone();

        run_blocking(move || {
            let _writer = engine.lock_index_writer()?;
            let index = SearchIndex::new();

            engine.db.write(|writer| {
                writer.clear_records()?;
                writer.put_index_dump(index.serialize()?)
            }).map_err(into_store_error)?;

            engine.publish_index(index)?;
            info!("all records cleared");

            Ok(())
        }).await
    }
}
