/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! トランザクション内の共通処理を集約するモジュール
//!

use anyhow::{anyhow, Result};
use log::warn;
use redb::{ReadableMultimapTable, ReadableTable, WriteTransaction};

use crate::database::types::{BookInfo, IndexDump, PageId, PageInfo};

use super::schema::{
    BOOK_TABLE, DbError, INDEX_RECORD_ID, INDEX_TABLE, PAGE_CODE_TABLE,
    PAGE_ID_SEQUENCE, PAGE_KEY_TABLE, PAGE_TABLE, SEQUENCE_TABLE,
};

///
/// ドキュメントキーに属するページIDを収集する
///
/// # 引数
/// * `key_table` - ドキュメントキー索引テーブル
/// * `key` - ドキュメントキー
///
/// # 戻り値
/// ページIDの一覧を昇順で返す。
///
pub(in crate::database) fn collect_page_ids<T>(
    key_table: &T,
    key: &str,
) -> Result<Vec<PageId>>
where
    T: ReadableMultimapTable<String, PageId>,
{
    let mut ids = Vec::new();
    for entry in key_table.get(key.to_string())? {
        ids.push(entry?.value());
    }

    Ok(ids)
}

///
/// ページIDの一覧からページ情報を収集する
///
/// # 引数
/// * `page_table` - ページ情報テーブル
/// * `ids` - ページIDの一覧
///
/// # 戻り値
/// 見つかったページ情報を`ids`の順で返す。
///
/// # 注記
/// 索引にだけ残っているIDは警告を出して読み飛ばす。
///
pub(in crate::database) fn collect_pages<T>(
    page_table: &T,
    ids: &[PageId],
) -> Result<Vec<PageInfo>>
where
    T: ReadableTable<PageId, PageInfo>,
{
    let mut pages = Vec::with_capacity(ids.len());
    for id in ids {
        match page_table.get(*id)? {
            Some(entry) => pages.push(entry.value()),
            None => warn!("page record is missing: {}", id),
        }
    }

    Ok(pages)
}

///
/// カーソルを進めながらドキュメントキーに属するページを切り出す
///
/// # 引数
/// * `key_table` - ドキュメントキー索引テーブル
/// * `page_table` - ページ情報テーブル
/// * `key` - ドキュメントキー
/// * `skip` - 読み飛ばす件数
/// * `limit` - 取り出す最大件数
/// * `step` - 読み飛ばし時に一度に進める最大件数
///
/// # 戻り値
/// 切り出したページ情報を返す。
///
pub(in crate::database) fn collect_page_window<K, P>(
    key_table: &K,
    page_table: &P,
    key: &str,
    skip: usize,
    limit: usize,
    step: usize,
) -> Result<Vec<PageInfo>>
where
    K: ReadableMultimapTable<String, PageId>,
    P: ReadableTable<PageId, PageInfo>,
{
    let mut cursor = key_table.get(key.to_string())?;
    let step = step.max(1);

    /*
     * 読み飛ばし
     */
    let mut position = 0;
    while position < skip {
        let advance = (skip - position).min(step);
        match cursor.nth(advance - 1) {
            Some(entry) => {
                entry?;
            }
            None => return Ok(Vec::new()),
        }
        position += advance;
    }

    /*
     * 切り出し
     */
    let mut pages = Vec::new();
    while pages.len() < limit {
        let id = match cursor.next() {
            Some(entry) => entry?.value(),
            None => break,
        };

        match page_table.get(id)? {
            Some(entry) => pages.push(entry.value()),
            None => warn!("page record is missing: {}", id),
        }
    }

    Ok(pages)
}

///
/// ページIDの払い出し
///
/// # 引数
/// * `txn` - 書き込みトランザクション
///
/// # 戻り値
/// 新しいページIDを返す。
///
/// # 注記
/// 削除されたページのIDは再利用しない。
///
pub(in crate::database) fn next_page_id_in_txn(
    txn: &WriteTransaction,
) -> Result<PageId> {
    let mut table = txn.open_table(SEQUENCE_TABLE)?;
    let name = PAGE_ID_SEQUENCE.to_string();
    let last = table.get(&name)?.map(|entry| entry.value()).unwrap_or(0);
    let next = last + 1;
    table.insert(&name, next)?;

    Ok(PageId::new(next))
}

///
/// ブック情報の取得
///
pub(in crate::database) fn get_book_in_txn(
    txn: &WriteTransaction,
    key: &str,
) -> Result<Option<BookInfo>> {
    let table = txn.open_table(BOOK_TABLE)?;
    Ok(table.get(key.to_string())?.map(|entry| entry.value()))
}

///
/// ブック情報の登録(上書き)
///
pub(in crate::database) fn put_book_in_txn(
    txn: &WriteTransaction,
    book: &BookInfo,
) -> Result<()> {
    let mut table = txn.open_table(BOOK_TABLE)?;
    table.insert(book.document_key().to_string(), book)?;
    Ok(())
}

///
/// ブック情報の削除
///
/// # 戻り値
/// 削除したブック情報を返す。存在しなかった場合は`None`を返す。
///
pub(in crate::database) fn delete_book_in_txn(
    txn: &WriteTransaction,
    key: &str,
) -> Result<Option<BookInfo>> {
    let mut table = txn.open_table(BOOK_TABLE)?;
    let removed = table.remove(key.to_string())?.map(|entry| entry.value());
    Ok(removed)
}

///
/// ドキュメントキーに属するページ情報の取得
///
pub(in crate::database) fn list_pages_by_key_in_txn(
    txn: &WriteTransaction,
    key: &str,
) -> Result<Vec<PageInfo>> {
    let ids = {
        let key_table = txn.open_multimap_table(PAGE_KEY_TABLE)?;
        collect_page_ids(&key_table, key)?
    };

    let page_table = txn.open_table(PAGE_TABLE)?;
    collect_pages(&page_table, &ids)
}

///
/// ページ情報の登録
///
/// # 引数
/// * `txn` - 書き込みトランザクション
/// * `page` - 登録するページ情報(IDは無視される)
///
/// # 戻り値
/// ID割り当て済みのページ情報を返す。(ドキュメントキー, コード)が既存ページ
/// と競合した場合は`DbError::PageCodeConflict`を返す。
///
pub(in crate::database) fn insert_page_in_txn(
    txn: &WriteTransaction,
    page: PageInfo,
) -> Result<PageInfo> {
    let key = page.document_key().to_string();
    let code_key = (key.clone(), page.code().to_string());

    /*
     * 一意制約の確認
     */
    let mut code_table = txn.open_table(PAGE_CODE_TABLE)?;
    if code_table.get(&code_key)?.is_some() {
        return Err(anyhow!(DbError::PageCodeConflict));
    }

    /*
     * 本体と索引の登録
     */
    let id = next_page_id_in_txn(txn)?;
    let page = page.with_id(id);

    code_table.insert(&code_key, id)?;

    let mut key_table = txn.open_multimap_table(PAGE_KEY_TABLE)?;
    key_table.insert(&key, id)?;

    let mut page_table = txn.open_table(PAGE_TABLE)?;
    page_table.insert(id, &page)?;

    Ok(page)
}

///
/// ページ情報の削除
///
/// # 戻り値
/// 削除したページ情報を返す。存在しなかった場合は`None`を返す。
///
pub(in crate::database) fn delete_page_in_txn(
    txn: &WriteTransaction,
    id: PageId,
) -> Result<Option<PageInfo>> {
    let removed = {
        let mut page_table = txn.open_table(PAGE_TABLE)?;
        let removed = page_table.remove(id)?.map(|entry| entry.value());
        removed
    };

    if let Some(page) = &removed {
        let key = page.document_key().to_string();

        let mut key_table = txn.open_multimap_table(PAGE_KEY_TABLE)?;
        key_table.remove(&key, id)?;

        let mut code_table = txn.open_table(PAGE_CODE_TABLE)?;
        code_table.remove((key, page.code().to_string()))?;
    }

    Ok(removed)
}

///
/// ドキュメントキーに属する全ページの削除
///
/// # 戻り値
/// 削除したページ情報を返す。
///
pub(in crate::database) fn delete_pages_by_key_in_txn(
    txn: &WriteTransaction,
    key: &str,
) -> Result<Vec<PageInfo>> {
    let ids = {
        let key_table = txn.open_multimap_table(PAGE_KEY_TABLE)?;
        collect_page_ids(&key_table, key)?
    };

    let mut removed = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(page) = delete_page_in_txn(txn, id)? {
            removed.push(page);
        }
    }

    Ok(removed)
}

///
/// ドキュメントキーに属するページの有無
///
pub(in crate::database) fn has_pages_in_txn(
    txn: &WriteTransaction,
    key: &str,
) -> Result<bool> {
    let key_table = txn.open_multimap_table(PAGE_KEY_TABLE)?;
    Ok(!key_table.get(key.to_string())?.is_empty())
}

///
/// インデックスダンプの保存
///
pub(in crate::database) fn put_index_dump_in_txn(
    txn: &WriteTransaction,
    dump: String,
) -> Result<()> {
    let mut table = txn.open_table(INDEX_TABLE)?;
    table.insert(INDEX_RECORD_ID, IndexDump::new(INDEX_RECORD_ID, dump))?;
    Ok(())
}

///
/// 全ブック・全ページの削除
///
/// # 注記
/// ページIDの連番はリセットしない。
///
pub(in crate::database) fn clear_records_in_txn(
    txn: &WriteTransaction,
) -> Result<()> {
    /*
     * ページ情報テーブル
     */
    {
        let mut table = txn.open_table(PAGE_TABLE)?;
        let ids = table.iter()?
            .map(|entry| entry.map(|(id, _)| id.value()))
            .collect::<Result<Vec<_>, _>>()?;
        for id in ids {
            table.remove(id)?;
        }
    }

    /*
     * ページコード索引テーブル
     */
    {
        let mut table = txn.open_table(PAGE_CODE_TABLE)?;
        let keys = table.iter()?
            .map(|entry| entry.map(|(key, _)| key.value()))
            .collect::<Result<Vec<_>, _>>()?;
        for key in keys {
            table.remove(key)?;
        }
    }

    /*
     * ドキュメントキー索引テーブル
     */
    {
        let mut table = txn.open_multimap_table(PAGE_KEY_TABLE)?;
        let keys = table.iter()?
            .map(|entry| entry.map(|(key, _)| key.value()))
            .collect::<Result<Vec<_>, _>>()?;
        for key in keys {
            table.remove_all(key)?;
        }
    }

    /*
     * ブック情報テーブル
     */
    {
        let mut table = txn.open_table(BOOK_TABLE)?;
        let keys = table.iter()?
            .map(|entry| entry.map(|(key, _)| key.value()))
            .collect::<Result<Vec<_>, _>>()?;
        for key in keys {
            table.remove(key)?;
        }
    }

    Ok(())
}
