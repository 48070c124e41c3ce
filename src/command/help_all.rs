/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"help-all"の実装
//!

use anyhow::Result;
use clap::CommandFactory;

use crate::cmd_args::Options;
use super::CommandContext;

/// ヘルプ出力の区切り線
const SEPARATOR: &str = "----------------------------------------------";

///
/// "help-all"サブコマンドのコンテキスト情報をパックした構造体
///
struct HelpAllCommandContext;

// CommandContextの実装
impl CommandContext for HelpAllCommandContext {
    fn exec(&self) -> Result<()> {
        print!("{}", render_help_all());
        Ok(())
    }
}

///
/// 全コマンドのヘルプ文字列の生成
///
/// # 戻り値
/// ルートコマンドと全サブコマンドのロングヘルプを連結した文字列を返す。
///
fn render_help_all() -> String {
    let root = Options::command();

    let mut entries = Vec::new();
    entries.push((root.get_name().to_string(), root.clone()));
    collect_commands(&root, "", &mut entries);

    let mut output = String::new();
    for (path, mut command) in entries {
        output.push('\n');
        output.push_str(SEPARATOR);
        output.push('\n');
        output.push_str(&path);
        output.push_str("\n\n");

        let help = command.render_long_help().to_string();
        for line in help.lines() {
            output.push_str("  ");
            output.push_str(line);
            output.push('\n');
        }
    }

    output
}

fn collect_commands(
    cmd: &clap::Command,
    prefix: &str,
    entries: &mut Vec<(String, clap::Command)>,
) {
    for sub in cmd.get_subcommands() {
        let path = if prefix.is_empty() {
            sub.get_name().to_string()
        } else {
            format!("{} {}", prefix, sub.get_name())
        };

        entries.push((path.clone(), sub.clone()));
        collect_commands(sub, &path, entries);
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    _opts: &Options,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(HelpAllCommandContext))
}
