// src/router.rs
use crate::augment::add_async_routes;
use crate::config::PlatformConfig;
use crate::error::{AppError, AppResult};
use crate::model::{HOME_PATH, RouteNode};
use crate::permission::filter_no_permission_tree;
use crate::resolver::ViewRegistry;
use crate::source::RouteSource;
use crate::storage::{ASYNC_ROUTES_KEY, LocalStorage, current_roles, remove_token};
use crate::tree::{ascending, filter_tree, format_flattening_routes, format_two_stage_routes};

/// 404 へ飛ばすキャッチオールルートの name
pub const PATH_MATCH_NAME: &str = "pathMatch";
const PATH_MATCH_PATH: &str = "/:pathMatch(.*)";
const NOT_FOUND_REDIRECT: &str = "/error/404";

/// 稼働中のルーターが持つルート表
///
/// `root` は起動時に渡したルート設定 (options.routes[0])、`records` は登録済みのルート。
/// records 内の "/" レコードの children は常に root.children と一致させる。
#[derive(Debug, Clone)]
pub struct RouteRegistry {
    root: RouteNode,
    records: Vec<RouteNode>,
}

impl RouteRegistry {
    pub fn new(root: RouteNode) -> Self {
        let records = vec![root.clone()];
        RouteRegistry { root, records }
    }

    /// 静的ルートから二階層のルート設定を組み立てる
    pub fn from_constant_routes(modules: &[RouteNode]) -> Self {
        let mut sorted = modules.to_vec();
        ascending(&mut sorted);
        let root = format_two_stage_routes(&format_flattening_routes(&sorted))
            .into_iter()
            .next()
            .unwrap_or_else(|| RouteNode::new(HOME_PATH));
        Self::new(root)
    }

    pub fn root(&self) -> &RouteNode {
        &self.root
    }

    pub fn root_children(&self) -> &[RouteNode] {
        &self.root.children
    }

    /// 登録済みのルート一覧 (router.getRoutes 相当)
    pub fn get_routes(&self) -> &[RouteNode] {
        &self.records
    }

    pub fn has_route(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name.as_deref() == Some(name))
    }

    /// ルートを登録する。同名のルートがあれば置き換える
    pub fn add_route(&mut self, route: RouteNode) {
        let existing = route
            .name
            .as_deref()
            .and_then(|name| self.records.iter().position(|r| r.name.as_deref() == Some(name)));
        match existing {
            Some(index) => self.records[index] = route,
            None => self.records.push(route),
        }
    }

    fn push_root_child(&mut self, route: RouteNode) {
        self.root.children.push(route);
        ascending(&mut self.root.children);
    }

    /// "/" レコードの children を root.children に揃える
    fn sync_flat_mirror(&mut self) {
        let children = self.root.children.clone();
        match self.records.iter_mut().find(|r| r.path == HOME_PATH) {
            Some(record) => record.children = children,
            None => {
                let mut record = self.root.clone();
                record.children = children;
                self.records.push(record);
            }
        }
    }

    /// "/" レコードの children
    pub fn flat_mirror(&self) -> &[RouteNode] {
        self.records
            .iter()
            .find(|r| r.path == HOME_PATH)
            .map(|r| r.children.as_slice())
            .unwrap_or_default()
    }

    pub fn is_consistent(&self) -> bool {
        self.flat_mirror() == self.root_children()
    }
}

/// keep-alive キャッシュの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Add,
    Delete,
    Refresh,
    /// Delete のあと Add (表示中ページの再生成)
    Reset,
}

/// メニューとキャッシュページの状態
#[derive(Debug, Clone, Default)]
pub struct PermissionStore {
    constant_menus: Vec<RouteNode>,
    whole_menus: Vec<RouteNode>,
    flattening_routes: Vec<RouteNode>,
    cache_page_list: Vec<String>,
}

impl PermissionStore {
    pub fn new(constant_routes: &[RouteNode]) -> Self {
        let mut constant_menus = constant_routes.to_vec();
        ascending(&mut constant_menus);
        PermissionStore {
            constant_menus,
            ..Default::default()
        }
    }

    /// 静的メニューと動的ルートから表示用メニューを組み立てる
    pub fn handle_whole_menus(&mut self, routes: &[RouteNode], current_roles: &[String]) {
        let mut combined = self.constant_menus.clone();
        combined.extend_from_slice(routes);

        let mut sorted = combined.clone();
        ascending(&mut sorted);
        self.whole_menus = filter_no_permission_tree(&filter_tree(&sorted), current_roles);
        self.flattening_routes = format_flattening_routes(&combined);
    }

    pub fn whole_menus(&self) -> &[RouteNode] {
        &self.whole_menus
    }

    pub fn flattening_routes(&self) -> &[RouteNode] {
        &self.flattening_routes
    }

    pub fn cache_page_list(&self) -> &[String] {
        &self.cache_page_list
    }

    pub fn cache_operate(&mut self, mode: CacheMode, name: &str) {
        match mode {
            CacheMode::Add => {
                if !self.cache_page_list.iter().any(|n| n == name) {
                    self.cache_page_list.push(name.to_string());
                }
            }
            CacheMode::Delete => {
                if let Some(index) = self.cache_page_list.iter().position(|n| n == name) {
                    self.cache_page_list.remove(index);
                }
            }
            CacheMode::Refresh => self.cache_page_list.retain(|n| n != name),
            CacheMode::Reset => {
                self.cache_operate(CacheMode::Delete, name);
                self.cache_operate(CacheMode::Add, name);
            }
        }
    }

    pub fn clear_all_cache_page(&mut self) {
        self.cache_page_list.clear();
    }
}

/// ルート初期化の進行状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Fetching,
    CachedHit,
    CachedMiss,
    Augmenting,
    Registered,
    /// 取得失敗でログアウトした
    LoggedOut,
}

/// 動的ルートの取得から登録までを行うサービス
pub struct RouterService {
    registry: RouteRegistry,
    permissions: PermissionStore,
    views: ViewRegistry,
    storage: LocalStorage,
    config: PlatformConfig,
    state: InitState,
}

impl RouterService {
    pub fn new(
        registry: RouteRegistry,
        permissions: PermissionStore,
        views: ViewRegistry,
        storage: LocalStorage,
        config: PlatformConfig,
    ) -> Self {
        RouterService {
            registry,
            permissions,
            views,
            storage,
            config,
            state: InitState::Uninitialized,
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn permissions(&self) -> &PermissionStore {
        &self.permissions
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut LocalStorage {
        &mut self.storage
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    /// ルートを初期化する
    ///
    /// CachingAsyncRoutes が有効でキャッシュがあれば取得をスキップする。
    /// 取得結果の code が 0 以外ならログアウトしてエラーを返す。
    pub fn init_router(&mut self, source: &dyn RouteSource) -> AppResult<()> {
        if self.state == InitState::Registered {
            tracing::debug!("ルートは初期化済みです");
            return Ok(());
        }
        self.state = InitState::Fetching;

        if self.config.caching_async_routes {
            let cached: Option<Vec<RouteNode>> = self.storage.get_item(ASYNC_ROUTES_KEY)?;
            if let Some(list) = cached.filter(|l| !l.is_empty()) {
                tracing::info!("キャッシュされた動的ルートを使用: {} 件", list.len());
                self.state = InitState::CachedHit;
                self.handle_async_routes(&list);
                return Ok(());
            }
            self.state = InitState::CachedMiss;
        }

        let resp = source.get_async_routes()?;
        if resp.code != 0 {
            tracing::error!("動的ルートの取得に失敗: code={} {}", resp.code, resp.message);
            self.log_out()?;
            return Err(AppError::FetchFailed {
                code: resp.code,
                message: resp.message,
            });
        }

        self.handle_async_routes(&resp.data);
        if self.config.caching_async_routes {
            self.storage.set_item(ASYNC_ROUTES_KEY, &resp.data)?;
        }
        Ok(())
    }

    /// 動的ルート (サーバーから返されたルート) を処理する
    pub fn handle_async_routes(&mut self, route_list: &[RouteNode]) {
        self.state = InitState::Augmenting;
        let roles = current_roles(&self.storage);

        if route_list.is_empty() {
            self.permissions.handle_whole_menus(route_list, &roles);
        } else {
            let augmented = add_async_routes(route_list, &self.views);
            for v in format_flattening_routes(&augmented) {
                // 重複登録を防ぐ
                if self.registry.root_children().iter().any(|c| c.path == v.path) {
                    tracing::debug!("登録済みのためスキップ: {}", v.path);
                    continue;
                }
                self.registry.push_root_child(v.clone());
                let registered = v.name.as_deref().is_some_and(|n| self.registry.has_route(n));
                if !registered {
                    self.registry.add_route(v);
                }
                self.registry.sync_flat_mirror();
            }
            self.permissions.handle_whole_menus(&augmented, &roles);
        }

        self.add_path_match();
        self.state = InitState::Registered;
        tracing::info!(
            "動的ルートを登録しました: ルート {} 件 / メニュー {} 件",
            self.registry.get_routes().len(),
            self.permissions.whole_menus().len()
        );
    }

    /// キャッチオールルートを一度だけ登録する
    pub fn add_path_match(&mut self) {
        if !self.registry.has_route(PATH_MATCH_NAME) {
            let mut route = RouteNode::new(PATH_MATCH_PATH);
            route.name = Some(PATH_MATCH_NAME.to_string());
            route.redirect = Some(NOT_FOUND_REDIRECT.to_string());
            self.registry.add_route(route);
        }
    }

    /// キャッシュページを操作する (mode 省略時は Reset)
    pub fn handle_alive_route(&mut self, name: &str, mode: Option<CacheMode>) {
        self.permissions
            .cache_operate(mode.unwrap_or(CacheMode::Reset), name);
    }

    /// ログイン情報と初期化状態を破棄する
    pub fn log_out(&mut self) -> AppResult<()> {
        remove_token(&mut self.storage)?;
        self.permissions.clear_all_cache_page();
        self.state = InitState::LoggedOut;
        Ok(())
    }

    /// 再ログイン時などにもう一度初期化できるようにする
    pub fn reset(&mut self, registry: RouteRegistry, permissions: PermissionStore) {
        self.registry = registry;
        self.permissions = permissions;
        self.state = InitState::Uninitialized;
    }
}
