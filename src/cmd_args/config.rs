/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! コンフィギュレーション情報の定義
//!

use std::default::Default;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::{default_log_path, default_db_path, LogLevel};
use crate::engine::{
    DEFAULT_EXPIRATION_SECS, DEFAULT_MAX_SUGGESTIONS, DEFAULT_PAGE_SIZE,
    DEFAULT_PAGE_URL_BASE,
};

///
/// コンフィギュレーションデータを集約する構造体
///
#[derive(Debug, Deserialize, Serialize)]
pub(super) struct Config {
    #[serde(skip)]
    config_path: Option<PathBuf>,

    /// グローバルオプションに対する情報
    global: Option<GlobalInfo>,

    /// ingestサブコマンド用の設定
    ingest: Option<IngestInfo>,

    /// 検索系サブコマンド用の設定
    search: Option<SearchInfo>,

    /// bookサブコマンド用の設定
    book: Option<BookSection>,
}

impl Config {
    ///
    /// グローバル設定のログレベルを更新
    ///
    pub(super) fn set_log_level(&mut self, level: LogLevel) {
        let global = self.ensure_global();
        global.log_level = Some(level);
    }

    ///
    /// グローバル設定のログ出力先を更新
    ///
    pub(super) fn set_log_output(&mut self, path: PathBuf) {
        let global = self.ensure_global();
        global.log_output = Some(path);
    }

    ///
    /// グローバル設定のデータベースパスを更新
    ///
    pub(super) fn set_db_path(&mut self, path: PathBuf) {
        let global = self.ensure_global();
        global.db_path = Some(path);
    }

    ///
    /// ingestサブコマンドの有効期間を更新
    ///
    pub(super) fn set_ingest_expiration(&mut self, secs: i64) {
        let ingest = self.ensure_ingest();
        ingest.expiration_secs = Some(secs);
    }

    ///
    /// ページURLのベースを更新
    ///
    pub(super) fn set_search_page_url_base(&mut self, base: String) {
        let search = self.ensure_search();
        search.page_url_base = Some(base);
    }

    ///
    /// 検索結果の最大件数を更新
    ///
    pub(super) fn set_search_max_suggestions(&mut self, max: usize) {
        let search = self.ensure_search();
        search.max_suggestions = Some(max);
    }

    ///
    /// 1ページあたりの件数を更新
    ///
    pub(super) fn set_search_page_size(&mut self, size: usize) {
        let search = self.ensure_search();
        search.page_size = Some(size);
    }

    ///
    /// book listサブコマンドの詳細表示指定を更新
    ///
    pub(super) fn set_book_list_long_info(&mut self, long_info: bool) {
        let list = self.ensure_book_list();
        list.long_info = Some(long_info);
    }

    ///
    /// データベースファイルへのパスへのアクセサ
    ///
    /// # 戻り値
    /// データベースファイルパスが設定されている場合はパス情報を`Some()`でラップ
    /// して返す。
    ///
    pub(super) fn db_path(&self) -> Option<PathBuf> {
        self.global
            .as_ref()
            .and_then(|global| global.db_path.as_ref())
            .map(|path| self.resolve_path(path))
    }

    ///
    /// ログレベルへのアクセサ
    ///
    pub(super) fn log_level(&self) -> Option<LogLevel> {
        self.global
            .as_ref()
            .and_then(|global| global.log_level)
    }

    ///
    /// ログ出力先へのアクセサ
    ///
    pub(super) fn log_output(&self) -> Option<PathBuf> {
        self.global
            .as_ref()
            .and_then(|global| global.log_output.as_ref())
            .map(|path| self.resolve_path(path))
    }

    ///
    /// ingestサブコマンドの有効期間(秒)へのアクセサ
    ///
    pub(super) fn ingest_expiration(&self) -> Option<i64> {
        self.ingest
            .as_ref()
            .and_then(|ingest| ingest.expiration_secs)
    }

    ///
    /// ページURLのベースへのアクセサ
    ///
    pub(super) fn search_page_url_base(&self) -> Option<String> {
        self.search
            .as_ref()
            .and_then(|search| search.page_url_base.clone())
    }

    ///
    /// 検索結果の最大件数へのアクセサ
    ///
    pub(super) fn search_max_suggestions(&self) -> Option<usize> {
        self.search
            .as_ref()
            .and_then(|search| search.max_suggestions)
    }

    ///
    /// 1ページあたりの件数へのアクセサ
    ///
    pub(super) fn search_page_size(&self) -> Option<usize> {
        self.search
            .as_ref()
            .and_then(|search| search.page_size)
    }

    ///
    /// book listサブコマンドの詳細表示指定へのアクセサ
    ///
    pub(super) fn book_list_long_info(&self) -> Option<bool> {
        self.book
            .as_ref()
            .and_then(|book| book.list.as_ref())
            .and_then(|list| list.long_info)
    }

    ///
    /// コンフィギュレーション情報の保存
    ///
    /// # 戻り値
    /// 保存に成功した場合は`Ok(())`を返す。失敗した場合はエラー情報を`Err()`で
    /// ラップして返す。
    ///
    pub(super) fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>
    {
        if let Err(err) = std::fs::write(path, &toml::to_string(self)?) {
            Err(anyhow!("write config error: {}", err))
        } else {
            Ok(())
        }
    }

    ///
    /// グローバル設定の初期化または取得
    ///
    fn ensure_global(&mut self) -> &mut GlobalInfo {
        self.global.get_or_insert_with(|| GlobalInfo {
            log_level: None,
            log_output: None,
            db_path: None,
        })
    }

    fn ensure_ingest(&mut self) -> &mut IngestInfo {
        self.ingest.get_or_insert_with(|| IngestInfo {
            expiration_secs: None,
        })
    }

    fn ensure_search(&mut self) -> &mut SearchInfo {
        self.search.get_or_insert_with(|| SearchInfo {
            page_url_base: None,
            max_suggestions: None,
            page_size: None,
        })
    }

    fn ensure_book_list(&mut self) -> &mut BookListInfo {
        self.book
            .get_or_insert_with(|| BookSection { list: None })
            .list
            .get_or_insert_with(|| BookListInfo { long_info: None })
    }

    ///
    /// コンフィギュレーションのパスに応じてパスを解決
    ///
    /// # 戻り値
    /// config.tomlが存在するディレクトリを基準に解決したパスを返す。
    ///
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }

        if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                return Self::normalize_path(parent.join(path));
            }
        }

        path.to_path_buf()
    }

    fn normalize_path(path: PathBuf) -> PathBuf {
        let mut result = PathBuf::new();
        let mut segments: Vec<OsString> = Vec::new();
        let mut prefix: Option<std::path::PrefixComponent<'_>> = None;
        let mut has_root = false;

        for component in path.components() {
            match component {
                Component::Prefix(value) => prefix = Some(value),
                Component::RootDir => has_root = true,
                Component::CurDir => {}
                Component::ParentDir => {
                    if segments.pop().is_none() && !has_root {
                        segments.push(OsString::from(".."));
                    }
                }
                Component::Normal(value) => segments.push(value.to_os_string()),
            }
        }

        if let Some(value) = prefix {
            result.push(value.as_os_str());
        }

        if has_root {
            result.push(Path::new("/"));
        }

        for segment in segments {
            result.push(segment);
        }

        result
    }
}

// Defaultトレイトの実装
impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            global: Some(GlobalInfo {
                log_level: Some(LogLevel::Info),
                log_output: Some(default_log_path()),
                db_path: Some(default_db_path()),
            }),

            ingest: Some(IngestInfo {
                expiration_secs: Some(DEFAULT_EXPIRATION_SECS),
            }),

            search: Some(SearchInfo {
                page_url_base: Some(DEFAULT_PAGE_URL_BASE.to_string()),
                max_suggestions: Some(DEFAULT_MAX_SUGGESTIONS),
                page_size: Some(DEFAULT_PAGE_SIZE),
            }),

            book: Some(BookSection {
                list: Some(BookListInfo {
                    long_info: Some(false),
                }),
            }),
        }
    }
}

///
/// グローバル設定を格納する構造体
///
#[derive(Debug, Deserialize, Serialize)]
struct GlobalInfo {
    /// ログレベル
    log_level: Option<LogLevel>,

    /// ログの出力先
    log_output: Option<PathBuf>,

    /// データベースファイルへのパス
    db_path: Option<PathBuf>,
}

///
/// コンフィギュレーション情報の読み込み
///
pub(super) fn load<P>(path: P) -> Result<Config>
where
    P: AsRef<Path>
{
    let path = path.as_ref();
    let mut config: Config = toml::from_str(&std::fs::read_to_string(path)?)?;
    config.config_path = Some(path.to_path_buf());
    Ok(config)
}

///
/// ingestサブコマンドの設定情報
///
#[derive(Debug, Deserialize, Serialize)]
struct IngestInfo {
    /// 再インデックスまでの有効期間(秒)
    expiration_secs: Option<i64>,
}

///
/// 検索系サブコマンドの設定情報
///
#[derive(Debug, Deserialize, Serialize)]
struct SearchInfo {
    /// ブック形式のページURLのベース
    page_url_base: Option<String>,

    /// 検索結果の最大件数
    max_suggestions: Option<usize>,

    /// 1ページあたりの件数
    page_size: Option<usize>,
}

///
/// bookサブコマンドの設定情報
///
#[derive(Debug, Deserialize, Serialize)]
struct BookSection {
    /// book listサブコマンドの設定情報
    list: Option<BookListInfo>,
}

///
/// book listサブコマンドの設定情報
///
#[derive(Debug, Deserialize, Serialize)]
struct BookListInfo {
    /// 詳細表示の有無
    long_info: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_search_section_from_toml() {
        let toml_str = r#"
            [search]
            page_url_base = "https://books.example.com/kit"
            max_suggestions = 5

            [ingest]
            expiration_secs = 60
        "#;

        let config: Config = toml::from_str(toml_str).expect("parse failed");
        assert_eq!(
            config.search_page_url_base(),
            Some("https://books.example.com/kit".to_string())
        );
        assert_eq!(config.search_max_suggestions(), Some(5));
        assert_eq!(config.search_page_size(), None);
        assert_eq!(config.ingest_expiration(), Some(60));
    }

    #[test]
    fn default_values_are_present() {
        let config = Config::default();
        assert_eq!(config.ingest_expiration(), Some(DEFAULT_EXPIRATION_SECS));
        assert_eq!(config.search_page_size(), Some(DEFAULT_PAGE_SIZE));
        assert_eq!(config.book_list_long_info(), Some(false));
    }

    #[test]
    fn serialize_uses_nested_book_list_section() {
        let config = Config::default();
        let output = toml::to_string(&config).expect("serialize failed");
        assert!(output.contains("[book.list]"));
        assert!(output.contains("[search]"));
        assert!(!output.contains("[book_list]"));
    }

    #[test]
    fn setters_create_missing_sections() {
        let mut config: Config = toml::from_str("").expect("parse failed");
        config.set_book_list_long_info(true);
        config.set_search_page_size(20);
        config.set_ingest_expiration(0);

        assert_eq!(config.book_list_long_info(), Some(true));
        assert_eq!(config.search_page_size(), Some(20));
        assert_eq!(config.ingest_expiration(), Some(0));
    }

    #[test]
    fn resolve_relative_paths_with_config_dir() {
        let toml_str = r#"
            [global]
            log_output = "log"
            db_path = "../db/docseek.redb"
        "#;

        let mut config: Config = toml::from_str(toml_str).expect("parse failed");
        config.config_path = Some(PathBuf::from("/tmp/config/config.toml"));

        assert_eq!(
            config.log_output(),
            Some(PathBuf::from("/tmp/config/log"))
        );
        assert_eq!(
            config.db_path(),
            Some(PathBuf::from("/tmp/db/docseek.redb"))
        );
    }

    #[test]
    fn keep_relative_paths_when_config_path_is_missing() {
        let toml_str = r#"
            [global]
            log_output = "log"
            db_path = "db/docseek.redb"
        "#;

        let config: Config = toml::from_str(toml_str).expect("parse failed");
        assert_eq!(config.log_output(), Some(PathBuf::from("log")));
        assert_eq!(config.db_path(), Some(PathBuf::from("db/docseek.redb")));
    }
}
