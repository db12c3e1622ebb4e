// src/tree.rs
use crate::model::RouteNode;

/// get_parent_paths で比較に使うフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKey {
    Path,
    Name,
}

impl RouteKey {
    fn matches(self, node: &RouteNode, value: &str) -> bool {
        match self {
            RouteKey::Path => node.path == value,
            RouteKey::Name => node.name.as_deref() == Some(value),
        }
    }
}

/// 各ノードに id / parent_id / path_list を付与する
///
/// id は兄弟内のインデックス、path_list は祖先の id に自身の id を加えたもの。
pub fn build_hierarchy_tree(tree: &mut [RouteNode]) {
    fn walk(nodes: &mut [RouteNode], path_list: &[usize]) {
        for (index, node) in nodes.iter_mut().enumerate() {
            node.id = Some(index);
            node.parent_id = path_list.last().copied();
            node.path_list = path_list.iter().copied().chain([index]).collect();
            if node.has_children() {
                let list = node.path_list.clone();
                walk(&mut node.children, &list);
            }
        }
    }
    walk(tree, &[]);
}

/// 多階層のルートを一次元の配列にする
///
/// 親の直後にその子孫が続く前順走査の並びになる。各要素は children を保持したまま。
pub fn format_flattening_routes(routes: &[RouteNode]) -> Vec<RouteNode> {
    if routes.is_empty() {
        return Vec::new();
    }
    let mut hierarchy = routes.to_vec();
    build_hierarchy_tree(&mut hierarchy);

    fn push_all(nodes: &[RouteNode], out: &mut Vec<RouteNode>) {
        for node in nodes {
            out.push(node.clone());
            push_all(&node.children, out);
        }
    }
    let mut flat = Vec::new();
    push_all(&hierarchy, &mut flat);
    flat
}

/// 一次元配列を二階層に組み直す
///
/// path が "/" の要素をルートとし、以降の要素はすべてその children になる。
/// 三階層以上のルートはすべて二階層目に繰り上がる。
pub fn format_two_stage_routes(routes: &[RouteNode]) -> Vec<RouteNode> {
    if routes.is_empty() {
        return Vec::new();
    }
    let mut stage: Vec<RouteNode> = Vec::new();
    for route in routes {
        if route.path == "/" {
            stage.push(RouteNode {
                path: route.path.clone(),
                name: route.name.clone(),
                redirect: route.redirect.clone(),
                component: route.component.clone(),
                meta: route.meta.clone(),
                ..Default::default()
            });
        } else if let Some(root) = stage.first_mut() {
            root.children.push(route.clone());
        }
    }
    stage
}

/// meta.show_link が false のノードを取り除く
///
/// 子がすべて取り除かれたディレクトリも一緒に取り除く。
pub fn filter_tree(data: &[RouteNode]) -> Vec<RouteNode> {
    data.iter()
        .filter(|v| v.meta.show_link != Some(false))
        .filter_map(|v| {
            let mut node = v.clone();
            node.children = filter_tree(&v.children);
            if v.has_children() && !node.has_children() {
                tracing::debug!("表示できる子が無いディレクトリを除外: {}", v.path);
                return None;
            }
            Some(node)
        })
        .collect()
}

/// rank を自動採番すべきノードか
///
/// 親を持たず、rank が無いか「ホーム以外で rank が 0」のもの。
fn hand_rank(route: &RouteNode) -> bool {
    route.parent_id.is_none()
        && match route.meta.rank {
            None => true,
            Some(0) => !route.is_home(),
            Some(_) => false,
        }
}

/// meta.rank の昇順に並べ替える
///
/// rank の無いトップレベルノードには index + 2 を割り当てる (0 / 1 はホーム用)。
/// それでも rank の無いノードは末尾に元の順序のまま並ぶ。
pub fn ascending(routes: &mut [RouteNode]) {
    for (index, route) in routes.iter_mut().enumerate() {
        if hand_rank(route) {
            route.meta.rank = Some(index as i64 + 2);
        }
    }
    routes.sort_by_key(|r| match r.meta.rank {
        Some(rank) => (0, rank),
        None => (1, 0),
    });
}

/// 指定した値を持つノードの祖先の path を上から順に返す
pub fn get_parent_paths(value: &str, routes: &[RouteNode], key: RouteKey) -> Vec<String> {
    fn dfs(routes: &[RouteNode], value: &str, key: RouteKey, parents: &mut Vec<String>) -> bool {
        for item in routes {
            if key.matches(item, value) {
                return true;
            }
            if !item.has_children() {
                continue;
            }
            parents.push(item.path.clone());
            if dfs(&item.children, value, key, parents) {
                return true;
            }
            parents.pop();
        }
        false
    }

    let mut parents = Vec::new();
    if dfs(routes, value, key, &mut parents) {
        parents
    } else {
        Vec::new()
    }
}

/// path が一致するルートを探す (同じ階層を先に調べてから子へ降りる)
pub fn find_route_by_path<'a>(path: &str, routes: &'a [RouteNode]) -> Option<&'a RouteNode> {
    routes.iter().find(|r| r.path == path).or_else(|| {
        routes
            .iter()
            .filter(|r| r.has_children())
            .find_map(|r| find_route_by_path(path, &r.children))
    })
}

/// 子が複数あれば redirect 先 (無ければ最初の子) を、そうでなければ自身を返す
pub fn handle_top_menu(route: &RouteNode) -> Option<&RouteNode> {
    if route.children.len() > 1 {
        match &route.redirect {
            Some(redirect) => route.children.iter().find(|c| &c.path == redirect),
            None => route.children.first(),
        }
    } else {
        Some(route)
    }
}

/// 全メニューの中で最初に表示すべきメニューを返す
pub fn get_top_menu(whole_menus: &[RouteNode]) -> Option<&RouteNode> {
    let first = whole_menus.first()?.children.first()?;
    handle_top_menu(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(path: &str, children: Vec<RouteNode>) -> RouteNode {
        let mut n = RouteNode::new(path);
        n.children = children;
        n
    }

    fn ranked(path: &str, rank: Option<i64>) -> RouteNode {
        let mut n = RouteNode::new(path);
        n.meta.rank = rank;
        n
    }

    fn paths(routes: &[RouteNode]) -> Vec<&str> {
        routes.iter().map(|r| r.path.as_str()).collect()
    }

    fn sample_forest() -> Vec<RouteNode> {
        vec![
            node("/", vec![node("/welcome", vec![])]),
            node(
                "/system",
                vec![
                    node("/system/user", vec![]),
                    node("/system/menu", vec![node("/system/menu/button", vec![])]),
                ],
            ),
        ]
    }

    #[test]
    fn test_build_hierarchy_tree() {
        let mut forest = sample_forest();
        build_hierarchy_tree(&mut forest);
        let button = &forest[1].children[1].children[0];
        assert_eq!(button.id, Some(0));
        assert_eq!(button.parent_id, Some(1));
        assert_eq!(button.path_list, vec![1, 1, 0]);
        assert_eq!(forest[0].parent_id, None);
    }

    #[test]
    fn test_flattening_is_preorder() {
        let flat = format_flattening_routes(&sample_forest());
        assert_eq!(
            paths(&flat),
            vec![
                "/",
                "/welcome",
                "/system",
                "/system/user",
                "/system/menu",
                "/system/menu/button"
            ]
        );
        // 親は children を保持したまま
        assert_eq!(flat[2].children.len(), 2);
    }

    #[test]
    fn test_flattening_empty() {
        assert!(format_flattening_routes(&[]).is_empty());
        assert!(format_two_stage_routes(&[]).is_empty());
    }

    #[test]
    fn test_flatten_then_two_stage_promotes_deep_nodes() {
        let flat = format_flattening_routes(&sample_forest());
        let stage = format_two_stage_routes(&flat);
        assert_eq!(stage.len(), 1);
        assert_eq!(stage[0].path, "/");
        assert_eq!(
            paths(&stage[0].children),
            vec![
                "/welcome",
                "/system",
                "/system/user",
                "/system/menu",
                "/system/menu/button"
            ]
        );
    }

    #[test]
    fn test_filter_tree_drops_hidden() {
        let mut forest = sample_forest();
        forest[1].children[0].meta.show_link = Some(false);
        forest[0].meta.show_link = Some(true);
        let filtered = filter_tree(&forest);
        assert_eq!(paths(&filtered), vec!["/", "/system"]);
        assert_eq!(paths(&filtered[1].children), vec!["/system/menu"]);
        // 元のツリーは変更されない
        assert_eq!(forest[1].children.len(), 2);
    }

    #[test]
    fn test_filter_tree_drops_directory_emptied_by_hidden_children() {
        let mut forest = vec![
            node("/d", vec![node("/d/hidden", vec![])]),
            node("/e", vec![node("/e/f", vec![node("/e/f/hidden", vec![])])]),
            node("/leaf", vec![]),
        ];
        forest[0].children[0].meta.show_link = Some(false);
        forest[1].children[0].children[0].meta.show_link = Some(false);
        let filtered = filter_tree(&forest);
        assert_eq!(paths(&filtered), vec!["/leaf"]);
    }

    #[test]
    fn test_ascending_home_first_and_stable() {
        let mut home = ranked("/", Some(0));
        home.name = Some("Home".into());
        let mut routes = vec![
            ranked("/five", Some(5)),
            ranked("/a", None),
            home,
            ranked("/b", None),
        ];
        ascending(&mut routes);
        assert_eq!(paths(&routes), vec!["/", "/a", "/five", "/b"]);
        assert_eq!(routes[1].meta.rank, Some(3));
        assert_eq!(routes[3].meta.rank, Some(5));
    }

    #[test]
    fn test_ascending_zero_rank_non_home_is_reassigned() {
        let mut routes = vec![ranked("/x", Some(0)), ranked("/y", Some(1))];
        ascending(&mut routes);
        assert_eq!(routes[1].meta.rank, Some(2));
        assert_eq!(paths(&routes), vec!["/y", "/x"]);
    }

    #[test]
    fn test_ascending_child_without_rank_sorts_last() {
        let mut child = ranked("/c", None);
        child.parent_id = Some(0);
        let mut routes = vec![child, ranked("/r", Some(9))];
        ascending(&mut routes);
        assert_eq!(paths(&routes), vec!["/r", "/c"]);
        assert_eq!(routes[1].meta.rank, None);
    }

    #[test]
    fn test_get_parent_paths() {
        let forest = sample_forest();
        assert_eq!(
            get_parent_paths("/system/menu/button", &forest, RouteKey::Path),
            vec!["/system".to_string(), "/system/menu".to_string()]
        );
        assert!(get_parent_paths("/system", &forest, RouteKey::Path).is_empty());
        assert!(get_parent_paths("/missing", &forest, RouteKey::Path).is_empty());

        let mut named = sample_forest();
        named[1].children[0].name = Some("SystemUser".into());
        assert_eq!(
            get_parent_paths("SystemUser", &named, RouteKey::Name),
            vec!["/system".to_string()]
        );
    }

    #[test]
    fn test_find_route_by_path() {
        let forest = sample_forest();
        assert_eq!(
            find_route_by_path("/system/menu/button", &forest).map(|r| r.path.as_str()),
            Some("/system/menu/button")
        );
        assert!(find_route_by_path("/none", &forest).is_none());
    }

    #[test]
    fn test_top_menu() {
        let mut system = sample_forest().remove(1);
        system.redirect = Some("/system/menu".into());
        let menus = vec![node("/", vec![system.clone()])];
        assert_eq!(
            get_top_menu(&menus).map(|r| r.path.as_str()),
            Some("/system/menu")
        );

        system.redirect = None;
        assert_eq!(
            handle_top_menu(&system).map(|r| r.path.as_str()),
            Some("/system/user")
        );
        let leaf = node("/leaf", vec![]);
        assert_eq!(handle_top_menu(&leaf).map(|r| r.path.as_str()), Some("/leaf"));
        assert!(get_top_menu(&[]).is_none());
    }

    fn count(routes: &[RouteNode]) -> usize {
        routes.iter().map(|r| 1 + count(&r.children)).sum()
    }

    fn arb_forest() -> impl Strategy<Value = Vec<RouteNode>> {
        let leaf = "[a-z]{1,6}".prop_map(|s| RouteNode::new(format!("/{s}")));
        let tree = leaf.prop_recursive(3, 24, 4, |inner| {
            ("[a-z]{1,6}", prop::collection::vec(inner, 0..4)).prop_map(|(s, children)| {
                let mut n = RouteNode::new(format!("/{s}"));
                n.children = children;
                n
            })
        });
        prop::collection::vec(tree, 0..5)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// 平坦化しても全ノードが欠けずに残る
        #[test]
        fn prop_flattening_keeps_every_node(forest in arb_forest()) {
            let flat = format_flattening_routes(&forest);
            prop_assert_eq!(flat.len(), count(&forest));
            for entry in &flat {
                if let Some(parent) = entry.parent_id {
                    prop_assert!(entry.path_list.len() >= 2);
                    prop_assert_eq!(entry.path_list[entry.path_list.len() - 2], parent);
                }
            }
        }

        /// ascending は要素を失わず、rank は非減少になる
        #[test]
        fn prop_ascending_is_sorted_permutation(
            ranks in prop::collection::vec(prop::option::of(0i64..10), 0..12)
        ) {
            let mut routes: Vec<RouteNode> = ranks
                .iter()
                .enumerate()
                .map(|(i, r)| ranked(&format!("/r{i}"), *r))
                .collect();
            ascending(&mut routes);
            prop_assert_eq!(routes.len(), ranks.len());
            let sorted: Vec<i64> = routes.iter().map(|r| r.meta.rank.unwrap_or(i64::MAX)).collect();
            prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
