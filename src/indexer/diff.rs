/*
 * Light weight and small wiki system for local use
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 新旧の一覧から差分パッチを生成するモジュール
//!

///
/// パッチ操作
///
#[derive(Clone, Debug, PartialEq)]
pub enum PatchOp<T> {
    /// 旧一覧にのみ存在する要素の削除
    Remove(Vec<T>),

    /// 新一覧にのみ存在する要素の追加
    Add(Vec<T>),
}

///
/// 差分パッチの生成
///
/// # 引数
/// * `old` - 旧一覧
/// * `new` - 新一覧
/// * `eq` - 要素の同値判定
///
/// # 戻り値
/// 削除、追加の順で空でない操作だけを並べたパッチを返す。
///
/// # 注記
/// 全組み合わせを比較するため計算量はO(n*m)となる。
///
pub fn get_patch<T, F>(old: &[T], new: &[T], eq: F) -> Vec<PatchOp<T>>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let to_remove: Vec<T> = old.iter()
        .filter(|item| !new.iter().any(|other| eq(*item, other)))
        .cloned()
        .collect();

    let to_add: Vec<T> = new.iter()
        .filter(|item| !old.iter().any(|other| eq(other, *item)))
        .cloned()
        .collect();

    let mut patch = Vec::new();
    if !to_remove.is_empty() {
        patch.push(PatchOp::Remove(to_remove));
    }

    if !to_add.is_empty() {
        patch.push(PatchOp::Add(to_add));
    }

    patch
}

///
/// パッチを削除対象と追加対象に分解する
///
pub fn split_patch<T>(patch: Vec<PatchOp<T>>) -> (Vec<T>, Vec<T>) {
    let mut removed = Vec::new();
    let mut added = Vec::new();

    for op in patch {
        match op {
            PatchOp::Remove(items) => removed.extend(items),
            PatchOp::Add(items) => added.extend(items),
        }
    }

    (removed, added)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(a: &(u32, &str), b: &(u32, &str)) -> bool {
        a.1 == b.1
    }

    fn names<'a>(list: &[(u32, &'a str)]) -> Vec<&'a str> {
        list.iter().map(|item| item.1).collect()
    }

    #[test]
    fn remove_precedes_add() {
        let old = vec![(1, "a"), (2, "b"), (3, "c")];
        let new = vec![(0, "b"), (0, "c"), (0, "d")];

        let patch = get_patch(&old, &new, same);
        assert_eq!(patch, vec![
            PatchOp::Remove(vec![(1, "a")]),
            PatchOp::Add(vec![(0, "d")]),
        ]);
    }

    #[test]
    fn identical_lists_produce_empty_patch() {
        let items = vec![(1, "a"), (2, "b")];
        assert!(get_patch(&items, &items, same).is_empty());
        assert!(get_patch::<(u32, &str), _>(&[], &[], same).is_empty());
    }

    #[test]
    fn applying_patch_reaches_new_list() {
        let old = vec![(1, "a"), (2, "b"), (3, "c")];
        let new = vec![(0, "c"), (0, "x"), (0, "a"), (0, "y")];

        let (removed, added) = split_patch(get_patch(&old, &new, same));
        let mut applied: Vec<(u32, &str)> = old.iter()
            .filter(|item| !removed.iter().any(|r| same(item, r)))
            .cloned()
            .chain(added)
            .collect();
        applied.sort_by_key(|item| item.1);

        let mut expected = new.clone();
        expected.sort_by_key(|item| item.1);
        assert_eq!(names(&applied), names(&expected));

        // 適用後の一覧との差分は空になる
        assert!(get_patch(&applied, &new, same).is_empty());
    }
}
