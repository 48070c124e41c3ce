/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ストアと検索インデックスを束ねた非同期エンジンを提供するモジュール
//!

mod error;
mod indexing;
mod key_lock;
mod maintenance;
mod query;
mod transfer;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use anyhow::{anyhow, Result};
use chrono::Duration;
use log::{info, warn};

use crate::database::DatabaseManager;
use crate::fts::{FtsDocument, SearchIndex};
use key_lock::KeyLocks;

pub use error::EngineError;
pub use indexing::{IndexOptions, IndexOutcome};
pub use query::{BookSummary, SearchHit, SearchPage, Suggestion};
pub use transfer::{ExportData, ImportSummary};

/// 再インデックスまでの既定の有効期間(秒)
pub const DEFAULT_EXPIRATION_SECS: i64 = 3600;

/// ページURLの既定のベース
pub const DEFAULT_PAGE_URL_BASE: &str =
    "https://uuapp.plus4u.net/uu-bookkit-maing01";

/// 検索結果の既定の最大件数
pub const DEFAULT_MAX_SUGGESTIONS: usize = 30;

/// 1ページあたりの既定の件数
pub const DEFAULT_PAGE_SIZE: usize = 100;

///
/// エンジンの動作設定
///
#[derive(Clone, Debug)]
pub struct EngineSettings {
    /// ブックを再インデックスするまでの有効期間
    pub expiration: Duration,

    /// ブック形式のページURLのベース
    pub page_url_base: String,

    /// 検索結果の最大件数
    pub max_suggestions: usize,

    /// 1ページあたりの既定の件数
    pub page_size: usize,
}

// Defaultトレイトの実装
impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            expiration: Duration::seconds(DEFAULT_EXPIRATION_SECS),
            page_url_base: DEFAULT_PAGE_URL_BASE.to_string(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

///
/// 検索エンジン本体
///
/// # 概要
/// レコードストアとメモリ上の転置インデックスを保持し、インデックス処理、
/// 検索、保守操作を非同期APIとして提供する。クローンしたオブジェクトは同じ
/// ストアとインデックスを共有する。
///
/// # 注記
/// インデックスを変更する操作はストアの書き込みトランザクションとインデック
/// スの作業コピーの更新を組にして行い、コミット成功後に作業コピーを公開す
/// る。この一連の処理は`index_writer`によって直列化される。
///
#[derive(Clone)]
pub struct Engine {
    /// レコードストア
    db: Arc<DatabaseManager>,

    /// 公開中の検索インデックス(未初期化時は`None`)
    index: Arc<RwLock<Option<SearchIndex>>>,

    /// インデックス更新の直列化用ロック
    index_writer: Arc<Mutex<()>>,

    /// ドキュメントキー単位のロック表
    locks: KeyLocks,

    /// 動作設定
    settings: Arc<EngineSettings>,
}

impl Engine {
    ///
    /// エンジンオブジェクトの生成
    ///
    /// # 引数
    /// * `db` - 所有させるデータベースマネージャオブジェクト
    /// * `settings` - 動作設定
    ///
    /// # 戻り値
    /// 生成したオブジェクトを返す。インデックスは未初期化の状態となる。
    ///
    pub fn new(db: DatabaseManager, settings: EngineSettings) -> Self {
        Self {
            db: Arc::new(db),
            index: Arc::new(RwLock::new(None)),
            index_writer: Arc::new(Mutex::new(())),
            locks: KeyLocks::default(),
            settings: Arc::new(settings),
        }
    }

    ///
    /// データベースファイルを開いてエンジンを生成
    ///
    /// # 引数
    /// * `db_path` - データベースファイルのパス
    /// * `settings` - 動作設定
    ///
    /// # 戻り値
    /// 生成したオブジェクトを`Ok()`でラップして返す。
    ///
    pub fn open<P>(db_path: P, settings: EngineSettings) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self::new(DatabaseManager::open(db_path)?, settings))
    }

    ///
    /// 動作設定へのアクセサ
    ///
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    ///
    /// インデックスが初期化済みか否か
    ///
    pub fn is_index_initialized(&self) -> bool {
        self.index.read()
            .map(|index| index.is_some())
            .unwrap_or(false)
    }

    ///
    /// 検索インデックスの初期化
    ///
    /// # 概要
    /// ストアに保存されたダンプからインデックスを復元する。ダンプが存在しな
    /// い場合は空のインデックスを生成する。
    ///
    /// # 戻り値
    /// 処理に成功した場合はインデックスに登録されている文書数を`Ok()`でラップ
    /// して返す。
    ///
    /// # 注記
    /// ダンプの読み込みに失敗した場合は警告を出力し、格納済みの全ページから
    /// インデックスを再構築する。
    ///
    pub async fn initialize_index(&self) -> Result<usize> {
        let engine = self.clone();

        run_blocking(move || {
            let _writer = engine.lock_index_writer()?;

            let index = match engine.db.get_index_dump()? {
                Some(dump) => match SearchIndex::load(&dump) {
                    Ok(index) => index,
                    Err(err) => {
                        warn!("stored index is unreadable, rebuilding: {:#}", err);
                        engine.rebuild_locked()?
                    }
                },
                None => SearchIndex::new(),
            };

            let count = index.len();
            engine.publish_index(index)?;
            info!("search index initialized with {} documents", count);

            Ok(count)
        }).await
    }

    ///
    /// 検索インデックスの再構築
    ///
    /// # 戻り値
    /// 処理に成功した場合は再構築後の文書数を`Ok()`でラップして返す。
    ///
    pub async fn rebuild_index(&self) -> Result<usize> {
        let engine = self.clone();

        run_blocking(move || {
            let _writer = engine.lock_index_writer()?;
            let index = engine.rebuild_locked()?;
            let count = index.len();
            engine.publish_index(index)?;
            info!("search index rebuilt with {} documents", count);

            Ok(count)
        }).await
    }

    ///
    /// 全ページからインデックスを再構築してダンプを保存する
    ///
    /// # 注記
    /// 呼び出し側で`index_writer`を取得しておくこと。
    ///
    fn rebuild_locked(&self) -> Result<SearchIndex> {
        let mut index = SearchIndex::new();

        for page in self.db.get_all_pages()? {
            if let Some(id) = page.id() {
                index.add_doc(id, &FtsDocument::from_page(&page));
            }
        }

        self.db.put_index_dump(index.serialize()?)
            .map_err(into_store_error)?;

        Ok(index)
    }

    ///
    /// インデックス更新用ロックの取得
    ///
    fn lock_index_writer(&self) -> Result<MutexGuard<'_, ()>> {
        self.index_writer.lock()
            .map_err(|_| anyhow!("index writer lock is poisoned"))
    }

    ///
    /// 公開中のインデックスの作業コピーを取得
    ///
    /// # 戻り値
    /// インデックスの複製を`Ok()`でラップして返す。未初期化の場合は
    /// `EngineError::IndexNotInitialized`を返す。
    ///
    fn snapshot_index(&self) -> Result<SearchIndex> {
        self.with_index(|index| index.clone())
    }

    ///
    /// 公開中のインデックスを参照して処理を行う
    ///
    fn with_index<F, T>(&self, func: F) -> Result<T>
    where
        F: FnOnce(&SearchIndex) -> T,
    {
        let guard = self.index.read()
            .map_err(|_| anyhow!("search index lock is poisoned"))?;

        match guard.as_ref() {
            Some(index) => Ok(func(index)),
            None => Err(anyhow!(EngineError::IndexNotInitialized)),
        }
    }

    ///
    /// インデックスの初期化確認
    ///
    fn ensure_index(&self) -> Result<()> {
        self.with_index(|_| ())
    }

    ///
    /// 作業コピーを公開インデックスとして差し替える
    ///
    fn publish_index(&self, index: SearchIndex) -> Result<()> {
        let mut guard = self.index.write()
            .map_err(|_| anyhow!("search index lock is poisoned"))?;

        *guard = Some(index);
        Ok(())
    }
}

///
/// ブロッキング処理をブロッキング用スレッドプールで実行する
///
/// # 引数
/// * `func` - 実行する処理
///
/// # 戻り値
/// 処理の結果を返す。
///
async fn run_blocking<F, T>(func: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(func).await?
}

///
/// ストア操作のエラーを`EngineError::StoreTransaction`に変換する
///
/// # 注記
/// 既に`EngineError`であるものはそのまま返す。
///
fn into_store_error(err: anyhow::Error) -> anyhow::Error {
    if err.downcast_ref::<EngineError>().is_some() {
        err
    } else {
        anyhow!(EngineError::StoreTransaction(format!("{:#}", err)))
    }
}
