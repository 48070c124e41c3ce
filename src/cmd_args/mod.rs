/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! コマンドライン引数を取り扱うモジュール
//!

mod config;
mod logger;

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use anyhow::{anyhow, Result};
use chrono::Duration;
use clap::{Args, Parser, Subcommand, ValueEnum};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::command::{
    CommandContext, book_delete, book_list, commands, common, db_clear,
    db_export, db_import, fts_rebuild, fts_search, fts_suggest, help_all,
    ingest, page_delete, page_list,
};
use crate::database::types::PageId;
use crate::engine::{
    Engine, EngineSettings, DEFAULT_EXPIRATION_SECS, DEFAULT_MAX_SUGGESTIONS,
    DEFAULT_PAGE_SIZE, DEFAULT_PAGE_URL_BASE,
};
use crate::indexer::DocumentKind;
use config::Config;

/// デフォルトのコンフィギュレーションパス
static DEFAULT_CONFIG_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    BaseDirs::new()
        .map(|dirs| dirs.config_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
});

/// デフォルトのデータパス
static DEFAULT_DATA_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    BaseDirs::new()
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
});

///
/// デフォルトのコンフィグレーションファイルのパス情報を生成
///
/// # 戻り値
/// コンフィギュレーションファイルのパス情報
///
fn default_config_path() -> PathBuf {
    DEFAULT_CONFIG_PATH.join("config.toml")
}

///
/// デフォルトのログ出力先のパスを生成
///
/// # 戻り値
/// ログ出力先ディレクトリのパス情報
///
fn default_log_path() -> PathBuf {
    DEFAULT_DATA_PATH.join("log")
}

///
/// デフォルトのデータベースファイルのパス情報を生成
///
/// # 戻り値
/// データベースファイルのパス情報
///
fn default_db_path() -> PathBuf {
    DEFAULT_DATA_PATH.join("database.redb")
}

///
/// show_options()実装を要求するトレイト
///
trait ShowOptions {
    ///
    /// オプション設定内容の表示
    ///
    fn show_options(&self);
}

///
/// validate()実装を要求するトレイト
///
trait Validate {
    ///
    /// オプション設定内容の検証
    ///
    fn validate(&mut self) -> Result<()>;
}

///
/// apply_config()実装を要求するトレイト
///
trait ApplyConfig {
    ///
    /// オプション設定へのコンフィギュレーションの反映
    ///
    fn apply_config(&mut self, config: &Config);
}

///
/// ログレベルを指し示す列挙子
///
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum, Deserialize, Serialize)]
#[clap(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "UPPERCASE")]
enum LogLevel {
    /// ログを記録しない
    #[serde(alias = "off", alias = "OFF")]
    #[value(alias = "off")]
    None,

    /// エラー情報以上のレベルを記録
    Error,

    /// 警告情報以上のレベルを記録
    Warn,

    /// 一般情報以上のレベルを記録
    Info,

    /// デバッグ情報以上のレベルを記録
    Debug,

    /// トレース情報以上のレベルを記録
    Trace,
}

// Intoトレイトの実装
impl Into<log::LevelFilter> for LogLevel {
    fn into(self) -> log::LevelFilter {
        match self {
            Self::None => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

// AsRefトレイトの実装
impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            Self::None => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

///
/// グローバルオプション情報を格納する構造体
///
#[derive(Parser, Debug, Clone)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    about = "ドキュメントポータル向け全文検索エンジン",
    version,
    long_about = None,
    subcommand_required = false,
    arg_required_else_help = true,
)]
pub struct Options {
    /// config.tomlを使用する場合のパス
    #[arg(short = 'c', long = "config-path")]
    config_path: Option<PathBuf>,

    /// 記録するログレベルの指定
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL",
        ignore_case = true)]
    log_level: Option<LogLevel>,

    /// ログの出力先の指定
    #[arg(short = 'L', long = "log-output", value_name = "PATH")]
    log_output: Option<PathBuf>,

    /// ログを標準エラー出力にも同時出力するか否か
    #[arg(long = "log-tee")]
    log_tee: bool,

    /// データベースファイルのパス
    #[arg(short = 'd', long = "db-path")]
    db_path: Option<PathBuf>,

    /// ブック形式のページURLのベース
    #[arg(short = 'U', long = "page-url-base", value_name = "URL")]
    page_url_base: Option<String>,

    /// 検索結果の最大件数(config.tomlでのみ指定可能)
    #[arg(skip)]
    max_suggestions: Option<usize>,

    /// 1ページあたりの件数(config.tomlでのみ指定可能)
    #[arg(skip)]
    page_size: Option<usize>,

    /// 設定情報の表示
    #[arg(long = "show-options")]
    show_options: bool,

    /// 設定情報の保存
    #[arg(long = "save-config")]
    save_config: bool,

    /// 実行するサブコマンド
    #[command(subcommand)]
    command: Option<Command>,
}

impl Options {
    ///
    /// ログレベルへのアクセサ
    ///
    /// # 戻り値
    /// 設定されたログレベルを返す
    fn log_level(&self) -> LogLevel {
        if let Some(level) = self.log_level {
            level
        } else {
            LogLevel::Info
        }
    }

    ///
    /// ログの出力先へのアクセサ
    ///
    /// # 戻り値
    /// ログの出力先として設定されたパス情報を返す。未設定の場合はデフォルトの
    /// パスを返す。
    ///
    fn log_output(&self) -> PathBuf {
        if let Some(path) = &self.log_output {
            path.clone()
        } else {
            default_log_path()
        }
    }

    ///
    /// ログの標準エラー出力同時出力フラグへのアクセサ
    ///
    fn log_tee(&self) -> bool {
        self.log_tee
    }

    ///
    /// データベースパスへのアクセサ
    ///
    /// # 戻り値
    /// オプションで指定されたデータベースファイルへのパスを返す。オプションで未
    /// 定義の場合はデフォルトのパスを返す。
    ///
    pub(crate) fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            path.clone()
        } else {
            default_db_path()
        }
    }

    ///
    /// ページURLのベースへのアクセサ
    ///
    fn page_url_base(&self) -> String {
        self.page_url_base
            .clone()
            .unwrap_or_else(|| DEFAULT_PAGE_URL_BASE.to_string())
    }

    ///
    /// 検索結果の最大件数へのアクセサ
    ///
    fn max_suggestions(&self) -> usize {
        self.max_suggestions.unwrap_or(DEFAULT_MAX_SUGGESTIONS)
    }

    ///
    /// 1ページあたりの件数へのアクセサ
    ///
    fn page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    ///
    /// エンジンの動作設定の生成
    ///
    /// # 戻り値
    /// オプション情報を反映した動作設定を返す。
    ///
    pub(crate) fn engine_settings(&self) -> EngineSettings {
        let expiration = match &self.command {
            Some(Command::Ingest(opts)) => opts.expiration(),
            _ => DEFAULT_EXPIRATION_SECS,
        };

        EngineSettings {
            expiration: Duration::seconds(expiration),
            page_url_base: self.page_url_base(),
            max_suggestions: self.max_suggestions(),
            page_size: self.page_size(),
        }
    }

    ///
    /// エンジンのオープン
    ///
    /// # 戻り値
    /// オープンに成功した場合はエンジンオブジェクトを`Ok()`でラップして返
    /// す。失敗した場合はエラー情報を`Err()`でラップして返す。
    ///
    /// # 注記
    /// 検索インデックスは未初期化の状態で返す。
    ///
    pub(crate) fn open_engine(&self) -> Result<Engine> {
        let path = self.db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match Engine::open(&path, self.engine_settings()) {
            Ok(engine) => Ok(engine),
            Err(err) => Err(
                anyhow!("open failed: {}", err).context("database open")
            )
        }
    }

    ///
    /// コンフィギュレーションファイルの適用
    ///
    /// # 戻り値
    /// 処理に成功した場合は`Ok(())`を返す。
    ///
    /// # 注記
    /// config.tomlを読み込みオプション情報に反映する。
    ///
    fn apply_config(&mut self) -> Result<()> {
        let path = if let Some(path) = &self.config_path {
            // オプションでコンフィギュレーションファイルのパスが指定されて
            // いる場合、そのパスに何もなければエラー
            if !path.exists() {
                return Err(anyhow!("{} is not exists", path.display()));
            }

            path.clone()

        } else {
            default_config_path()
        };

        // この時点でパスに何も無い場合はそのまま何もせず正常終了
        if !path.exists() {
            return Ok(());
        }

        if !path.is_file() {
            return Err(anyhow!("{} is not file", path.display()));
        }

        match config::load(&path) {
            Ok(config) => {
                self.apply_loaded_config(&config);
                Ok(())
            }

            Err(err) => Err(anyhow!("{}", err))
        }
    }

    ///
    /// 読み込み済みのコンフィギュレーションの反映
    ///
    /// # 注記
    /// コマンドラインで指定済みの項目は上書きしない。
    ///
    fn apply_loaded_config(&mut self, config: &Config) {
        if self.log_level.is_none() {
            if let Some(level) = config.log_level() {
                self.log_level = Some(level);
            }
        }

        if self.log_output.is_none() {
            if let Some(path) = config.log_output() {
                self.log_output = Some(path);
            }
        }

        if self.db_path.is_none() {
            if let Some(path) = config.db_path() {
                self.db_path = Some(path);
            }
        }

        if self.page_url_base.is_none() {
            if let Some(base) = config.search_page_url_base() {
                self.page_url_base = Some(base);
            }
        }

        if self.max_suggestions.is_none() {
            self.max_suggestions = config.search_max_suggestions();
        }

        if self.page_size.is_none() {
            self.page_size = config.search_page_size();
        }

        // コマンド毎のオプション情報へもコンフィギュレーションの内容を反映す
        // る。
        let opts: Option<&mut dyn ApplyConfig> = match &mut self.command {
            Some(Command::Ingest(opts)) => Some(opts),
            Some(Command::Book(book)) => match &mut book.subcommand {
                BookSubCommand::List(opts) => Some(opts),
                _ => None,
            }
            _ => None,
        };

        if let Some(opts) = opts {
            opts.apply_config(config);
        }
    }

    ///
    /// オプション情報のバリデート
    ///
    /// # 戻り値
    /// オプション情報に矛盾が無い場合は`Ok(())`を返す。
    ///
    fn validate(&mut self) -> Result<()> {
        if self.show_options && self.save_config {
            return Err(anyhow!(
                "--show-options and --save-config can't be specified mutually"
            ));
        }

        if self.max_suggestions == Some(0) {
            return Err(anyhow!("max_suggestions must be greater than 0"));
        }

        if self.page_size == Some(0) {
            return Err(anyhow!("page_size must be greater than 0"));
        }

        if let Some(command) = &mut self.command {
            let opts: Option<&mut dyn Validate> = match command {
                Command::Ingest(opts) => Some(opts),
                Command::Fts(fts) => match &mut fts.subcommand {
                    FtsSubCommand::Search(opts) => Some(opts),
                    _ => None,
                }
                Command::Book(book) => match &mut book.subcommand {
                    BookSubCommand::Delete(opts) => Some(opts),
                    _ => None,
                }
                Command::Page(page) => match &mut page.subcommand {
                    PageSubCommand::List(opts) => Some(opts),
                    PageSubCommand::Delete(_) => None,
                }
                Command::Db(db) => match &mut db.subcommand {
                    DbSubCommand::Import(opts) => Some(opts),
                    _ => None,
                }
                Command::Commands => None,
                Command::HelpAll => None,
            };

            if let Some(opts) = opts {
                opts.validate()?;
            }
        }

        Ok(())
    }

    ///
    /// オプション設定内容の表示
    ///
    fn show_options(&self) {
        let config_path = if let Some(path) = &self.config_path {
            path.display().to_string()
        } else {
            let path = default_config_path();

            if path.exists() {
                path.display().to_string()
            } else {
                "(none)".to_string()
            }
        };

        println!("global options");
        println!("   config path:     {}", config_path);
        println!("   database path:   {}", self.db_path().display());
        println!("   log level:       {}", self.log_level().as_ref());
        println!("   log output:      {}", self.log_output().display());
        println!("   log tee:         {}", self.log_tee());
        println!("   page url base:   {}", self.page_url_base());
        println!("   max suggestions: {}", self.max_suggestions());
        println!("   page size:       {}", self.page_size());

        // サブコマンドが指定されており、そのサブコマンドがオプションを持つなら
        // そのオプションも表示する。
        if let Some(command) = &self.command {
            let opts: Option<&dyn ShowOptions> = match command {
                Command::Ingest(opts) => Some(opts),
                Command::Fts(fts) => match &fts.subcommand {
                    FtsSubCommand::Search(opts) => Some(opts),
                    FtsSubCommand::Suggest(opts) => Some(opts),
                    FtsSubCommand::Rebuild => None,
                }
                Command::Book(book) => match &book.subcommand {
                    BookSubCommand::List(opts) => Some(opts),
                    BookSubCommand::Delete(opts) => Some(opts),
                }
                Command::Page(page) => match &page.subcommand {
                    PageSubCommand::List(opts) => Some(opts),
                    PageSubCommand::Delete(opts) => Some(opts),
                }
                Command::Db(db) => match &db.subcommand {
                    DbSubCommand::Export(opts) => Some(opts),
                    DbSubCommand::Import(opts) => Some(opts),
                    DbSubCommand::Clear(opts) => Some(opts),
                }
                Command::Commands => None,
                Command::HelpAll => None,
            };

            if let Some(opts) = opts {
                println!("");
                opts.show_options();
            }
        }
    }

    ///
    /// サブコマンドのコマンドコンテキストの生成
    ///
    pub(crate) fn build_context(&self) -> Result<Box<dyn CommandContext>> {
        match &self.command {
            Some(Command::Ingest(opts)) => ingest::build_context(self, opts),
            Some(Command::Fts(fts)) => match &fts.subcommand {
                FtsSubCommand::Search(opts) => {
                    fts_search::build_context(self, opts)
                }
                FtsSubCommand::Suggest(opts) => {
                    fts_suggest::build_context(self, opts)
                }
                FtsSubCommand::Rebuild => fts_rebuild::build_context(self),
            }
            Some(Command::Book(book)) => match &book.subcommand {
                BookSubCommand::List(opts) => book_list::build_context(self, opts),
                BookSubCommand::Delete(opts) => {
                    book_delete::build_context(self, opts)
                }
            }
            Some(Command::Page(page)) => match &page.subcommand {
                PageSubCommand::List(opts) => page_list::build_context(self, opts),
                PageSubCommand::Delete(opts) => {
                    page_delete::build_context(self, opts)
                }
            }
            Some(Command::Db(db)) => match &db.subcommand {
                DbSubCommand::Export(opts) => db_export::build_context(self, opts),
                DbSubCommand::Import(opts) => db_import::build_context(self, opts),
                DbSubCommand::Clear(opts) => db_clear::build_context(self, opts),
            }
            Some(Command::Commands) => commands::build_context(self),
            Some(Command::HelpAll) => help_all::build_context(self),
            None => Err(anyhow!("command not specified")),
        }
    }
}

///
/// サブコマンドの定義
///
#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// 文書ペイロードの取り込み
    #[command(name = "ingest", alias = "in")]
    Ingest(IngestOpts),

    /// 全文検索コマンド一覧の表示
    #[command(name = "fts", alias = "i", alias = "index")]
    Fts(FtsCommand),

    /// ブック管理コマンド一覧の表示
    #[command(name = "book", alias = "b")]
    Book(BookCommand),

    /// ページ管理コマンド一覧の表示
    #[command(name = "page", alias = "p")]
    Page(PageCommand),

    /// データベース管理コマンド一覧の表示
    #[command(name = "db")]
    Db(DbCommand),

    /// サブコマンド一覧の表示
    #[command(name = "commands")]
    Commands,

    /// 全サブコマンドのヘルプ出力
    #[command(name = "help-all")]
    HelpAll,
}

#[derive(Clone, Args, Debug)]
pub(crate) struct FtsCommand {
    #[command(subcommand)]
    subcommand: FtsSubCommand,
}

#[derive(Clone, Args, Debug)]
pub(crate) struct BookCommand {
    #[command(subcommand)]
    subcommand: BookSubCommand,
}

#[derive(Clone, Args, Debug)]
pub(crate) struct PageCommand {
    #[command(subcommand)]
    subcommand: PageSubCommand,
}

#[derive(Clone, Args, Debug)]
pub(crate) struct DbCommand {
    #[command(subcommand)]
    subcommand: DbSubCommand,
}

#[derive(Clone, Debug, Subcommand)]
enum FtsSubCommand {
    /// 全文検索
    #[command(name = "search", alias = "s")]
    Search(FtsSearchOpts),

    /// 入力補完候補の表示
    #[command(name = "suggest", alias = "sg")]
    Suggest(FtsSuggestOpts),

    /// 全文検索インデックスの再構築
    #[command(name = "rebuild", alias = "r")]
    Rebuild,
}

#[derive(Clone, Debug, Subcommand)]
enum BookSubCommand {
    /// ブック一覧の表示
    #[command(name = "list", alias = "l", alias = "ls")]
    List(BookListOpts),

    /// ブックの削除
    #[command(name = "delete", alias = "d", alias = "del")]
    Delete(BookDeleteOpts),
}

#[derive(Clone, Debug, Subcommand)]
enum PageSubCommand {
    /// ブックに属するページ一覧の表示
    #[command(name = "list", alias = "l", alias = "ls")]
    List(PageListOpts),

    /// ページの削除
    #[command(name = "delete", alias = "d", alias = "del")]
    Delete(PageDeleteOpts),
}

#[derive(Clone, Debug, Subcommand)]
enum DbSubCommand {
    /// 全レコードのエクスポート
    #[command(name = "export", alias = "e")]
    Export(DbExportOpts),

    /// エクスポートデータのインポート
    #[command(name = "import", alias = "i")]
    Import(DbImportOpts),

    /// 全レコードの削除
    #[command(name = "clear")]
    Clear(DbClearOpts),
}

///
/// 取り込む文書の種別
///
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
#[clap(rename_all = "snake_case")]
pub(crate) enum IngestKind {
    /// メニューと構造情報を持つブック
    Structured,

    /// 緩い構造の管理文書
    Loose,
}

// Intoトレイトの実装
impl Into<DocumentKind> for IngestKind {
    fn into(self) -> DocumentKind {
        match self {
            Self::Structured => DocumentKind::Structured,
            Self::Loose => DocumentKind::Loose,
        }
    }
}

///
/// サブコマンドingestのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct IngestOpts {
    /// 文書の種別
    #[arg(short = 'k', long = "kind", value_name = "KIND",
        ignore_case = true)]
    kind: Option<IngestKind>,

    /// ペイロードの`url`の代わりに使用するURL
    #[arg(short = 'u', long = "url", value_name = "URL")]
    url: Option<String>,

    /// 有効期限内のブックも再インデックスする
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// 再インデックスまでの有効期間(秒)
    #[arg(short = 'e', long = "expiration", value_name = "SECS",
        allow_negative_numbers = true)]
    expiration: Option<i64>,

    /// 取り込むJSONファイルのパス("-"で標準入力)
    #[arg()]
    file_path: PathBuf,
}

impl IngestOpts {
    ///
    /// 文書種別へのアクセサ
    ///
    /// # 戻り値
    /// 指定された種別を返す。未指定の場合は構造化ブックとして扱う。
    ///
    pub(crate) fn kind(&self) -> DocumentKind {
        self.kind.unwrap_or(IngestKind::Structured).into()
    }

    ///
    /// URL指定へのアクセサ
    ///
    pub(crate) fn url(&self) -> Option<String> {
        self.url.clone()
    }

    ///
    /// 強制再インデックス指定へのアクセサ
    ///
    pub(crate) fn is_force(&self) -> bool {
        self.force
    }

    ///
    /// 有効期間(秒)へのアクセサ
    ///
    pub(crate) fn expiration(&self) -> i64 {
        self.expiration.unwrap_or(DEFAULT_EXPIRATION_SECS)
    }

    ///
    /// 入力ファイルのパスへのアクセサ
    ///
    pub(crate) fn file_path(&self) -> PathBuf {
        self.file_path.clone()
    }
}

// ApplyConfigトレイトの実装
impl ApplyConfig for IngestOpts {
    fn apply_config(&mut self, config: &Config) {
        if self.expiration.is_none() {
            if let Some(secs) = config.ingest_expiration() {
                self.expiration = Some(secs);
            }
        }
    }
}

// Validateトレイトの実装
impl Validate for IngestOpts {
    fn validate(&mut self) -> Result<()> {
        if self.expiration() < 0 {
            return Err(anyhow!("expiration must not be negative"));
        }

        validate_input_path(&self.file_path)
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for IngestOpts {
    fn show_options(&self) {
        println!("ingest command options");
        println!("   kind:       {}", self.kind());
        println!("   url:        {:?}", self.url());
        println!("   force:      {:?}", self.is_force());
        println!("   expiration: {}", self.expiration());
        println!("   file_path:  {}", self.file_path.display());
    }
}

///
/// サブコマンドfts searchのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct FtsSearchOpts {
    /// 絞り込むブックのドキュメントキー
    #[arg(short = 'b', long = "book", value_name = "KEY")]
    book_key: Option<String>,

    /// 1ページあたりの件数
    #[arg(short = 's', long = "page-size", value_name = "SIZE")]
    page_size: Option<usize>,

    /// 0始まりのページ番号
    #[arg(short = 'n', long = "page-num", value_name = "NUM")]
    page_num: Option<usize>,

    /// 検索クエリ
    #[arg()]
    query: String,
}

impl FtsSearchOpts {
    ///
    /// 検索クエリへのアクセサ
    ///
    pub(crate) fn query(&self) -> String {
        self.query.clone()
    }

    ///
    /// 絞り込みキーへのアクセサ
    ///
    pub(crate) fn book_key(&self) -> Option<String> {
        self.book_key.clone()
    }

    ///
    /// ページサイズ指定へのアクセサ
    ///
    pub(crate) fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    ///
    /// ページ番号へのアクセサ
    ///
    pub(crate) fn page_num(&self) -> usize {
        self.page_num.unwrap_or(0)
    }

    ///
    /// 絞り込みかページ分割が指定されているか否か
    ///
    /// # 戻り値
    /// いずれかが指定されている場合はtrueを返す。
    ///
    pub(crate) fn is_filtered(&self) -> bool {
        self.book_key.is_some()
            || self.page_size.is_some()
            || self.page_num.is_some()
    }
}

// Validateトレイトの実装
impl Validate for FtsSearchOpts {
    fn validate(&mut self) -> Result<()> {
        if self.query.trim().is_empty() && self.book_key.is_none() {
            return Err(anyhow!("query is empty"));
        }

        Ok(())
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for FtsSearchOpts {
    fn show_options(&self) {
        println!("fts search command options");
        println!("   book_key:  {:?}", self.book_key());
        println!("   page_size: {:?}", self.page_size());
        println!("   page_num:  {}", self.page_num());
        println!("   query:     {}", self.query());
    }
}

///
/// サブコマンドfts suggestのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct FtsSuggestOpts {
    /// 入力中の文字列
    #[arg()]
    query: String,
}

impl FtsSuggestOpts {
    ///
    /// 入力文字列へのアクセサ
    ///
    pub(crate) fn query(&self) -> String {
        self.query.clone()
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for FtsSuggestOpts {
    fn show_options(&self) {
        println!("fts suggest command options");
        println!("   query: {}", self.query());
    }
}

///
/// サブコマンドbook listのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct BookListOpts {
    /// 詳細情報の表示
    #[arg(short = 'l', long = "long-info")]
    long_info: bool,
}

impl BookListOpts {
    ///
    /// 詳細表示指定へのアクセサ
    ///
    pub(crate) fn is_long_info(&self) -> bool {
        self.long_info
    }
}

// ApplyConfigトレイトの実装
impl ApplyConfig for BookListOpts {
    fn apply_config(&mut self, config: &Config) {
        if !self.long_info {
            if let Some(long_info) = config.book_list_long_info() {
                self.long_info = long_info;
            }
        }
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for BookListOpts {
    fn show_options(&self) {
        println!("book list command options");
        println!("   long_info: {:?}", self.is_long_info());
    }
}

///
/// サブコマンドbook deleteのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct BookDeleteOpts {
    /// 削除するブックのドキュメントキー
    #[arg()]
    key: String,
}

impl BookDeleteOpts {
    ///
    /// ドキュメントキーへのアクセサ
    ///
    pub(crate) fn key(&self) -> String {
        self.key.clone()
    }
}

// Validateトレイトの実装
impl Validate for BookDeleteOpts {
    fn validate(&mut self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(anyhow!("document key is empty"));
        }

        Ok(())
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for BookDeleteOpts {
    fn show_options(&self) {
        println!("book delete command options");
        println!("   key: {}", self.key());
    }
}

///
/// サブコマンドpage listのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct PageListOpts {
    /// 1ページあたりの件数
    #[arg(short = 's', long = "page-size", value_name = "SIZE")]
    page_size: Option<usize>,

    /// 0始まりのページ番号
    #[arg(short = 'n', long = "page-num", value_name = "NUM")]
    page_num: Option<usize>,

    /// 詳細情報の表示
    #[arg(short = 'l', long = "long-info")]
    long_info: bool,

    /// 対象ブックのドキュメントキー
    #[arg()]
    key: String,
}

impl PageListOpts {
    ///
    /// ドキュメントキーへのアクセサ
    ///
    pub(crate) fn key(&self) -> String {
        self.key.clone()
    }

    ///
    /// ページサイズ指定へのアクセサ
    ///
    pub(crate) fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    ///
    /// ページ番号へのアクセサ
    ///
    pub(crate) fn page_num(&self) -> usize {
        self.page_num.unwrap_or(0)
    }

    ///
    /// 詳細表示指定へのアクセサ
    ///
    pub(crate) fn is_long_info(&self) -> bool {
        self.long_info
    }
}

// Validateトレイトの実装
impl Validate for PageListOpts {
    fn validate(&mut self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(anyhow!("document key is empty"));
        }

        Ok(())
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for PageListOpts {
    fn show_options(&self) {
        println!("page list command options");
        println!("   page_size: {:?}", self.page_size());
        println!("   page_num:  {}", self.page_num());
        println!("   long_info: {:?}", self.is_long_info());
        println!("   key:       {}", self.key());
    }
}

///
/// サブコマンドpage deleteのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct PageDeleteOpts {
    /// 削除するページのID
    #[arg()]
    id: u64,
}

impl PageDeleteOpts {
    ///
    /// ページIDへのアクセサ
    ///
    pub(crate) fn id(&self) -> PageId {
        PageId::new(self.id)
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for PageDeleteOpts {
    fn show_options(&self) {
        println!("page delete command options");
        println!("   id: {}", self.id);
    }
}

///
/// サブコマンドdb exportのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct DbExportOpts {
    /// 出力先のファイル(省略時または"-"で標準出力)
    #[arg()]
    output: Option<PathBuf>,
}

impl DbExportOpts {
    ///
    /// 出力先へのアクセサ
    ///
    /// # 戻り値
    /// ファイルへ出力する場合はパスを`Some()`でラップして返す。
    ///
    pub(crate) fn output(&self) -> Option<PathBuf> {
        self.output
            .as_ref()
            .filter(|path| !is_stdio_path(path))
            .cloned()
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for DbExportOpts {
    fn show_options(&self) {
        println!("db export command options");
        println!(
            "   output: {}",
            self.output()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(stdout)".to_string())
        );
    }
}

///
/// サブコマンドdb importのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct DbImportOpts {
    /// 取り込むエクスポートファイル("-"で標準入力)
    #[arg()]
    file_path: PathBuf,
}

impl DbImportOpts {
    ///
    /// 入力ファイルのパスへのアクセサ
    ///
    pub(crate) fn file_path(&self) -> PathBuf {
        self.file_path.clone()
    }
}

// Validateトレイトの実装
impl Validate for DbImportOpts {
    fn validate(&mut self) -> Result<()> {
        validate_input_path(&self.file_path)
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for DbImportOpts {
    fn show_options(&self) {
        println!("db import command options");
        println!("   file_path: {}", self.file_path.display());
    }
}

///
/// サブコマンドdb clearのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct DbClearOpts {
    /// 確認を行わずに削除する
    #[arg(short = 'y', long = "yes")]
    yes: bool,
}

impl DbClearOpts {
    ///
    /// 確認省略指定へのアクセサ
    ///
    pub(crate) fn is_confirmed(&self) -> bool {
        self.yes
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for DbClearOpts {
    fn show_options(&self) {
        println!("db clear command options");
        println!("   yes: {:?}", self.is_confirmed());
    }
}

///
/// 標準入出力を示すパスか否かの判定
///
pub(crate) fn is_stdio_path(path: &Path) -> bool {
    path.as_os_str() == "-"
}

///
/// 入力ファイル指定の検証
///
/// # 注記
/// "-"は標準入力として扱うため検証の対象外とする。
///
fn validate_input_path(path: &Path) -> Result<()> {
    if is_stdio_path(path) {
        return Ok(());
    }

    if !path.exists() {
        return Err(anyhow!("{} is not exists", path.display()));
    }

    if !path.is_file() {
        return Err(anyhow!("{} is not file", path.display()));
    }

    Ok(())
}

///
/// コマンドライン引数のパース処理
///
/// # 戻り値
/// オプション情報をまとめたオブジェクトを返す。
///
pub(crate) fn parse() -> Result<Arc<Options>> {
    let mut opts = Options::parse();

    /*
     * デフォルトデータパスの作成
     */
    std::fs::create_dir_all(DEFAULT_DATA_PATH.clone())?;

    /*
     * コンフィギュレーションファイルの適用
     */
    opts.apply_config()?;

    /*
     * 設定情報のバリデーション
     */
    opts.validate()?;

    /*
     * ログ機能の初期化
     */
    logger::init(&opts)?;

    /*
     * 設定情報の表示
     */
    if opts.show_options {
        opts.show_options();
        std::process::exit(0);
    }

    /*
     * 設定の保存
     */
    if opts.save_config {
        save_config(&opts)?;
        std::process::exit(0);
    }

    Ok(Arc::new(opts))
}

///
/// 設定保存が必要であればconfig.tomlへ書き込みを行う
///
/// # 概要
/// 既存の設定ファイルがある場合は読み込み、現在の設定内容で更新した上で保存
/// する。設定ファイルが存在しない場合はデフォルト設定を基準に更新して保存す
/// る。
///
/// # 引数
/// * `opts` - コマンドラインとコンフィグ適用後の設定情報
///
/// # 戻り値
/// 保存処理に成功した場合は`Ok(())`を返す。
///
fn save_config(opts: &Options) -> Result<()> {
    /*
     * 保存先パスの決定
     */
    let path = if let Some(path) = &opts.config_path {
        path.clone()
    } else {
        default_config_path()
    };

    /*
     * 既存ファイルの上書き確認
     */
    if path.exists() {
        let prompt = format!(
            "{} は既に存在します。上書きしますか？",
            path.display()
        );

        if !common::confirm(&prompt)? {
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    /*
     * 現在の設定内容を反映
     */
    let mut config = if path.exists() {
        config::load(&path)?
    } else {
        Config::default()
    };

    write_options_to_config(opts, &mut config);

    /*
     * 保存処理の実行
     */
    config.save(&path)?;

    Ok(())
}

///
/// オプション情報のコンフィギュレーションへの書き戻し
///
fn write_options_to_config(opts: &Options, config: &mut Config) {
    config.set_log_level(opts.log_level());
    config.set_log_output(opts.log_output());
    config.set_db_path(opts.db_path());
    config.set_search_page_url_base(opts.page_url_base());
    config.set_search_max_suggestions(opts.max_suggestions());
    config.set_search_page_size(opts.page_size());

    match &opts.command {
        Some(Command::Ingest(opts)) => {
            config.set_ingest_expiration(opts.expiration());
        }

        Some(Command::Book(book)) => match &book.subcommand {
            BookSubCommand::List(opts) => {
                config.set_book_list_long_info(opts.is_long_info());
            }
            _ => {}
        }

        _ => {}
    }
}
