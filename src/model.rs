// src/model.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// ホームルートの name
pub const HOME_NAME: &str = "Home";
/// ホームルートの path
pub const HOME_PATH: &str = "/";

/// ルートに割り当てられるコンポーネント
///
/// 出力時は文字列として表現する:
/// - `Declared`: サーバーから届いたままのコンポーネントパス
/// - `View`: ViewRegistry で解決済みのキー (`view:` プレフィックス)
/// - `Frame`: iframe ラッパー (`frame:` 固定値)
///
/// 入力側の文字列は内容にかかわらず常に `Declared` として読む。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Component {
    Declared(String),
    View(String),
    Frame,
}

const VIEW_PREFIX: &str = "view:";
const FRAME_TAG: &str = "frame:";

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Component::Declared)
    }
}

impl From<Component> for String {
    fn from(c: Component) -> Self {
        match c {
            Component::Declared(s) => s,
            Component::View(key) => format!("{VIEW_PREFIX}{key}"),
            Component::Frame => FRAME_TAG.to_string(),
        }
    }
}

/// ルートの meta 情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// 兄弟間の並び順 (小さいほど前)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,

    /// false の場合メニューに表示しない
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_link: Option<bool>,

    /// 閲覧に必要なロール。None は制限なし
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    /// ボタン単位の権限コード
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auths: Option<Vec<String>>,

    /// サーバー由来のルートであることを示す
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstage: Option<bool>,

    /// 設定されていれば iframe で表示する
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_tag: Option<bool>,

    /// 上記以外のキーはそのまま保持する
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// ナビゲーション可能な単位を表すツリーノード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,

    #[serde(default)]
    pub meta: RouteMeta,

    /// 配列以外の値が来た場合は子なしとして扱う
    #[serde(
        default,
        deserialize_with = "crate::parser::lenient_children",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<RouteNode>,

    /// 兄弟内のインデックス (build_hierarchy_tree が設定)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,

    /// 親ノードの id (build_hierarchy_tree が設定)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<usize>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_list: Vec<usize>,
}

impl RouteNode {
    pub fn new(path: impl Into<String>) -> Self {
        RouteNode {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// 子を持ちコンポーネントを持たない純粋なディレクトリか
    pub fn is_directory(&self) -> bool {
        self.has_children() && self.component.is_none()
    }

    pub fn is_home(&self) -> bool {
        self.name.as_deref() == Some(HOME_NAME) || self.path == HOME_PATH
    }
}

/// 動的ルート API のレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncRoutesResponse {
    pub code: i64,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub data: Vec<RouteNode>,
}

/// ローカルストレージに保存されるログインユーザー情報
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataInfo {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}
