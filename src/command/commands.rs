/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"commands"の実装
//!

use anyhow::Result;
use clap::CommandFactory;

use crate::cmd_args::Options;
use super::common::format_table;
use super::CommandContext;

///
/// "commands"サブコマンドのコンテキスト情報をパックした構造体
///
struct CommandsCommandContext;

// CommandContextの実装
impl CommandContext for CommandsCommandContext {
    fn exec(&self) -> Result<()> {
        let mut lines = Vec::new();
        collect_commands(&Options::command(), "", &mut lines);
        println!("{}", format_table(&lines));
        Ok(())
    }
}

///
/// サブコマンドの一覧を再帰的に収集する
///
/// # 注記
/// 各行は(コマンドパス, 別名, 説明)の3列で構成する。
///
fn collect_commands(
    cmd: &clap::Command,
    prefix: &str,
    lines: &mut Vec<Vec<String>>,
) {
    for sub in cmd.get_subcommands() {
        let name = sub.get_name();

        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", prefix, name)
        };

        let aliases = sub.get_all_aliases()
            .collect::<Vec<&str>>()
            .join(",");

        let description = sub
            .get_long_about()
            .or(sub.get_about())
            .map(|value| value.to_string())
            .unwrap_or_default();

        lines.push(vec![path.clone(), aliases, description]);
        collect_commands(sub, &path, lines);
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    _opts: &Options,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(CommandsCommandContext))
}
