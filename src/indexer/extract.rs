/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 文書ツリーから検索用の本文テキストを抽出するモジュール
//!

use log::warn;
use serde_json::Value;

/// 直接テキストを持つスカラーフィールド(抽出順)
const SCALAR_FIELDS: [&str; 5] = ["name", "title", "label", "header", "text"];

/// 再帰的に辿るコンテナフィールド(抽出順)
const CONTAINER_FIELDS: [&str; 4] =
    ["mainPanel", "sidePanel", "topSection", "bottomSection"];

/// 埋め込みJSONを持つウィジェットのタグ
const TABLE_TAG: &str = "Uu5TilesBricks.Table";

/// 埋め込みJSONのマーカー
const UU5_JSON_MARKER: &str = "<uu5json/>";

///
/// ノードから本文テキストを抽出する
///
/// # 概要
/// スカラーフィールド、見出しオブジェクト、テーブルウィジェットの埋め込み
/// JSON、コンテナフィールドの順にテキストを収集し、空白を1つにまとめて返す。
///
/// # 引数
/// * `node` - 抽出対象のノード
///
/// # 戻り値
/// 抽出したテキスト。テキストを持たないノードでは空文字列を返す。
///
/// # 注記
/// 埋め込みJSONの解析に失敗した場合は警告を出力し、そのノードの寄与を空文
/// 字列として扱う。
///
pub fn extract_text(node: &Value) -> String {
    let mut buf = String::new();
    collect_node_text(node, &mut buf);
    normalize_whitespace(&buf)
}

///
/// ノードのテキストをバッファに追記する
///
fn collect_node_text(node: &Value, buf: &mut String) {
    let Some(map) = node.as_object() else {
        return;
    };

    /*
     * スカラーフィールド
     */
    for field in SCALAR_FIELDS {
        if let Some(Value::String(text)) = map.get(field) {
            push_text(buf, text);
        }
    }

    /*
     * 見出しオブジェクト
     */
    if let Some(header @ Value::Object(_)) = map.get("header") {
        collect_node_text(header, buf);
        buf.push(' ');
    }

    /*
     * テーブルウィジェット
     */
    if map.get("uu5Tag").and_then(Value::as_str) == Some(TABLE_TAG) {
        if let Some(props) = map.get("props") {
            for field in ["data", "columns"] {
                if let Some(Value::String(raw)) = props.get(field) {
                    push_text(buf, &extract_uu5_json(raw));
                }
            }
        }
    }

    /*
     * コンテナフィールド
     */
    for field in ["content", "sectionList"] {
        if let Some(Value::Array(children)) = map.get(field) {
            for child in children {
                collect_node_text(child, buf);
                buf.push(' ');
            }
        }
    }

    for field in CONTAINER_FIELDS {
        if let Some(child) = map.get(field) {
            collect_node_text(child, buf);
            buf.push(' ');
        }
    }
}

///
/// 埋め込みJSONから文字列要素を全て取り出す
///
/// # 引数
/// * `raw` - マーカー付きのJSON文字列
///
/// # 戻り値
/// 取り出した文字列を空白区切りで連結して返す。マーカーが無い場合や解析に
/// 失敗した場合は空文字列を返す。
///
fn extract_uu5_json(raw: &str) -> String {
    let Some(body) = raw.strip_prefix(UU5_JSON_MARKER) else {
        return String::new();
    };

    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            let mut buf = String::new();
            collect_string_leaves(&value, &mut buf);
            buf.trim().to_string()
        }

        Err(err) => {
            warn!("failed to parse embedded uu5 json: {}", err);
            String::new()
        }
    }
}

///
/// 値に含まれる全ての文字列要素を収集する
///
fn collect_string_leaves(value: &Value, buf: &mut String) {
    match value {
        Value::String(text) => push_text(buf, text),
        Value::Array(items) => {
            items.iter().for_each(|item| collect_string_leaves(item, buf))
        }
        Value::Object(map) => {
            map.values().for_each(|item| collect_string_leaves(item, buf))
        }
        _ => {}
    }
}

fn push_text(buf: &mut String, text: &str) {
    buf.push_str(text);
    buf.push(' ');
}

///
/// 空白文字の連続を1つの空白にまとめ前後の空白を取り除く
///
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalar_fields_come_before_children() {
        let node = json!({
            "text": "body",
            "name": "Name",
            "content": [
                {"title": "Child"},
                "ignored plain string",
                {"label": "Leaf", "header": "Head"}
            ],
            "header": {"text": "Sub  header"}
        });

        assert_eq!(
            extract_text(&node),
            "Name body Sub header Child Leaf Head"
        );
    }

    #[test]
    fn panels_are_visited_in_fixed_order() {
        let node = json!({
            "bottomSection": {"text": "d"},
            "topSection": {"text": "c"},
            "sidePanel": {"text": "b"},
            "mainPanel": {"text": "a"},
            "sectionList": [{"text": "s"}]
        });

        assert_eq!(extract_text(&node), "s a b c d");
    }

    #[test]
    fn table_widget_payload_is_harvested() {
        let node = json!({
            "uu5Tag": "Uu5TilesBricks.Table",
            "props": {
                "data": "<uu5json/>[[\"Cell 1\", 2], [\"Cell 3\"]]",
                "columns": "<uu5json/>[{\"header\": \"Col\"}]"
            }
        });

        assert_eq!(extract_text(&node), "Cell 1 Cell 3 Col");
    }

    #[test]
    fn malformed_payloads_degrade_to_empty_text() {
        let node = json!({
            "uu5Tag": "Uu5TilesBricks.Table",
            "props": {"data": "<uu5json/>{broken", "columns": "no marker"},
            "text": "kept"
        });
        assert_eq!(extract_text(&node), "kept");

        assert_eq!(extract_text(&json!(null)), "");
        assert_eq!(extract_text(&json!([{"text": "x"}])), "");
        assert_eq!(extract_text(&json!({"content": "not a list"})), "");
    }
}
