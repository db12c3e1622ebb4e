use std::collections::HashSet;

use crate::model::{RouteMeta, RouteNode};
use crate::tree::filter_tree;

/// ロールフィルタを通過したノードと、フィルタ前にディレクトリだったかどうか
#[derive(Debug, Clone)]
pub struct FilteredNode {
    pub node: RouteNode,
    pub was_directory: bool,
}

/// 2 つの配列に共通する値があるか
///
/// 必要ロールが None (制限なし) の場合は常に true。
pub fn is_one_of_array(required: Option<&[String]>, current: &[String]) -> bool {
    match required {
        Some(required) => {
            let current: HashSet<&str> = current.iter().map(String::as_str).collect();
            required.iter().any(|r| current.contains(r.as_str()))
        }
        None => true,
    }
}

/// 子がすべて消えたディレクトリを取り除く
///
/// ディレクトリ自体はロールを持たず、表示可能な子が 1 つでもあれば表示される。
/// 残った子には表示フィルタ (show_link) も適用し、それで空になったものも取り除く。
pub fn filter_children_tree(nodes: Vec<FilteredNode>) -> Vec<RouteNode> {
    nodes
        .into_iter()
        .filter_map(|f| {
            let mut node = f.node;
            if node.has_children() {
                node.children = filter_tree(&node.children);
            }
            if f.was_directory && node.children.is_empty() {
                return None;
            }
            Some(node)
        })
        .collect()
}

/// 現在のユーザーのロールで閲覧できないメニューを取り除く
pub fn filter_no_permission_tree(data: &[RouteNode], current_roles: &[String]) -> Vec<RouteNode> {
    let kept = data
        .iter()
        .filter(|v| is_one_of_array(v.meta.roles.as_deref(), current_roles))
        .map(|v| {
            let mut node = v.clone();
            let was_directory = v.has_children();
            if was_directory {
                node.children = filter_no_permission_tree(&v.children, current_roles);
            }
            FilteredNode {
                node,
                was_directory,
            }
        })
        .collect();
    filter_children_tree(kept)
}

/// ボタン権限の問い合わせ値
#[derive(Debug, Clone, Copy)]
pub enum AuthValue<'a> {
    /// 単一のコード
    One(&'a str),
    /// すべてを満たす必要があるコードの組
    All(&'a [String]),
}

/// 現在のルートに設定されたボタン権限コード
pub fn get_auths(meta: &RouteMeta) -> Option<&[String]> {
    meta.auths.as_deref()
}

/// ボタン単位の権限があるか
pub fn has_auth(value: AuthValue<'_>, meta: &RouteMeta) -> bool {
    let Some(meta_auths) = get_auths(meta) else {
        return false;
    };
    match value {
        AuthValue::One("") => false,
        AuthValue::One(code) => meta_auths.iter().any(|a| a == code),
        AuthValue::All(codes) => codes.iter().all(|c| meta_auths.contains(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn leaf(path: &str, required: Option<&[&str]>) -> RouteNode {
        let mut n = RouteNode::new(path);
        n.meta.roles = required.map(roles);
        n
    }

    fn dir(path: &str, children: Vec<RouteNode>) -> RouteNode {
        let mut n = RouteNode::new(path);
        n.children = children;
        n
    }

    fn paths(routes: &[RouteNode]) -> Vec<&str> {
        routes.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn test_is_one_of_array() {
        let current = roles(&["user"]);
        assert!(is_one_of_array(None, &current));
        assert!(is_one_of_array(Some(roles(&["user", "admin"]).as_slice()), &current));
        assert!(!is_one_of_array(Some(roles(&["admin"]).as_slice()), &current));
        assert!(!is_one_of_array(Some(roles(&["admin"]).as_slice()), &[]));
    }

    #[test]
    fn test_admin_only_directory_is_pruned_for_user() {
        let forest = vec![
            dir("/system", vec![leaf("/system/role", Some(&["admin"][..]))]),
            dir(
                "/company",
                vec![
                    leaf("/company/list", Some(&["admin"][..])),
                    leaf("/company/package", None),
                ],
            ),
            leaf("/about", None),
        ];
        let filtered = filter_no_permission_tree(&forest, &roles(&["user"]));
        assert_eq!(paths(&filtered), vec!["/company", "/about"]);
        assert_eq!(paths(&filtered[0].children), vec!["/company/package"]);
    }

    #[test]
    fn test_leaf_without_children_is_never_pruned_as_directory() {
        let forest = vec![leaf("/a", None), leaf("/b", Some(&["user"][..]))];
        let filtered = filter_no_permission_tree(&forest, &roles(&["user"]));
        assert_eq!(paths(&filtered), vec!["/a", "/b"]);
    }

    #[test]
    fn test_empty_role_set_hides_restricted_nodes() {
        let forest = vec![
            dir(
                "/nested",
                vec![dir(
                    "/nested/inner",
                    vec![leaf("/nested/inner/x", Some(&["admin"][..]))],
                )],
            ),
            leaf("/open", None),
        ];
        let filtered = filter_no_permission_tree(&forest, &[]);
        assert_eq!(paths(&filtered), vec!["/open"]);
    }

    #[test]
    fn test_hidden_children_filtered_after_pruning() {
        let mut hidden = leaf("/d/hidden", None);
        hidden.meta.show_link = Some(false);
        let forest = vec![dir("/d", vec![hidden, leaf("/d/shown", None)])];
        let filtered = filter_no_permission_tree(&forest, &[]);
        assert_eq!(paths(&filtered[0].children), vec!["/d/shown"]);
    }

    #[test]
    fn test_directory_with_only_hidden_children_is_pruned() {
        let mut hidden = leaf("/d/hidden", None);
        hidden.meta.show_link = Some(false);
        let forest = vec![dir("/d", vec![hidden]), leaf("/about", None)];
        let filtered = filter_no_permission_tree(&forest, &roles(&["admin"]));
        assert_eq!(paths(&filtered), vec!["/about"]);
    }

    #[test]
    fn test_has_auth() {
        let mut meta = RouteMeta::default();
        assert!(!has_auth(AuthValue::One("btn:add"), &meta));

        meta.auths = Some(roles(&["btn:add", "btn:edit"]));
        assert!(has_auth(AuthValue::One("btn:add"), &meta));
        assert!(!has_auth(AuthValue::One("btn:delete"), &meta));
        assert!(!has_auth(AuthValue::One(""), &meta));
        assert!(has_auth(AuthValue::All(&roles(&["btn:add", "btn:edit"])), &meta));
        assert!(!has_auth(AuthValue::All(&roles(&["btn:add", "btn:delete"])), &meta));
    }
}
