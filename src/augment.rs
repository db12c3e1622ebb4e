// src/augment.rs
use crate::model::{Component, RouteNode};
use crate::resolver::ViewRegistry;

/// サーバーから返された動的ルートを正規のルートに作り直す
///
/// 入力は変更せず、新しいツリーを返す。各ノードについて:
/// 1) meta.backstage を立てる
/// 2) 子があり redirect が無ければ最初の子の path を redirect にする
/// 3) 子があり name が無ければ `<最初の子の name>Parent` を name にする
/// 4) コンポーネントを決める (iframe > ディレクトリ > 解決)
/// 5) 子を再帰的に処理する
pub fn add_async_routes(routes: &[RouteNode], views: &ViewRegistry) -> Vec<RouteNode> {
    let mut ancestors = Vec::new();
    augment_level(routes, views, &mut ancestors)
}

fn augment_level(
    routes: &[RouteNode],
    views: &ViewRegistry,
    ancestors: &mut Vec<String>,
) -> Vec<RouteNode> {
    routes
        .iter()
        .map(|route| {
            if ancestors.contains(&route.path) {
                // 祖先と同じ path を持つ子はそれ以上たどらない
                tracing::warn!("循環したルートを検出したため展開を中止します: {}", route.path);
                return route.clone();
            }
            let mut node = augment_node(route, views);
            if node.has_children() {
                ancestors.push(node.path.clone());
                node.children = augment_level(&node.children, views, ancestors);
                ancestors.pop();
            }
            node
        })
        .collect()
}

fn augment_node(route: &RouteNode, views: &ViewRegistry) -> RouteNode {
    let mut v = route.clone();
    v.meta.backstage = Some(true);

    if let Some(first) = v.children.first() {
        if v.redirect.is_none() {
            v.redirect = Some(first.path.clone());
        }
        if v.name.is_none() {
            match &first.name {
                Some(child_name) => v.name = Some(format!("{child_name}Parent")),
                None => tracing::warn!(
                    "最初の子に name が無いため親の name を決められません: {}",
                    v.path
                ),
            }
        }
    }

    if v.meta.frame_src.is_some() {
        // iframe 型
        v.component = Some(Component::Frame);
        return v;
    }

    let component_path = match &v.component {
        // 純粋なディレクトリ: クリックしても子メニューを開くだけ
        None if v.has_children() => {
            tracing::info!("ディレクトリノード (コンポーネントなし): {}", v.path);
            return v;
        }
        None => v.path.clone(),
        Some(Component::Declared(path)) => path.clone(),
        Some(Component::View(_) | Component::Frame) => {
            tracing::debug!("コンポーネントは解決済み: {}", v.path);
            return v;
        }
    };

    match views.resolve(&component_path) {
        Some(key) => {
            tracing::debug!("コンポーネント読み込み: {} -> {}", v.path, key);
            v.component = Some(Component::View(key));
        }
        None => {
            tracing::warn!(
                "コンポーネントが見つかりません: {} (componentPath: {})",
                v.path,
                component_path
            );
        }
    }
    v
}
