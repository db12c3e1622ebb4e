// src/modules.rs
//
// 静的に宣言されたルート (サーバーから取得しないもの)
use crate::model::{Component, RouteMeta, RouteNode};

fn meta(title: &str, rank: Option<i64>) -> RouteMeta {
    RouteMeta {
        title: Some(title.to_string()),
        rank,
        ..Default::default()
    }
}

fn route(path: &str, name: Option<&str>, component: Option<&str>, meta: RouteMeta) -> RouteNode {
    RouteNode {
        path: path.to_string(),
        name: name.map(str::to_string),
        component: component.map(|c| Component::Declared(c.to_string())),
        meta,
        ..Default::default()
    }
}

/// ホーム ("/") とウェルカムページ
pub fn home() -> RouteNode {
    let mut home = route("/", Some("Home"), Some("layout/index"), meta("首页", Some(0)));
    home.meta.icon = Some("ep/home-filled".into());
    home.redirect = Some("/welcome".into());
    home.children = vec![route(
        "/welcome",
        Some("Welcome"),
        Some("welcome/index"),
        meta("首页", None),
    )];
    home
}

/// ユーザー管理
pub fn user() -> RouteNode {
    let mut user = route(
        "/user/index",
        Some("User"),
        Some("platform/user/index"),
        meta("用户管理", Some(1)),
    );
    user.meta.icon = Some("ep/set-up".into());
    user.meta.show_link = Some(true);
    user
}

/// About
pub fn about() -> RouteNode {
    let mut about = route("/about", None, None, meta("关于", None));
    about.meta.icon = Some("ri/file-info-line".into());
    about.redirect = Some("/about/index".into());
    about.children = vec![route(
        "/about/index",
        Some("About"),
        Some("about/index"),
        meta("关于", None),
    )];
    about
}

/// 起動時から存在するルート一覧
pub fn constant_routes() -> Vec<RouteNode> {
    vec![home(), user(), about()]
}
