use path_absolutize::Absolutize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::error::AppResult;

/// 対応するビューファイルの拡張子
pub const VIEW_EXTENSIONS: [&str; 2] = ["vue", "tsx"];

/// レジストリキーの共通プレフィックス (例: "/src/views/system/dict/index.vue")
const VIEW_KEY_PREFIX: &str = "/src/views/";

/// ローダーを呼び出して得られるビュー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewComponent {
    /// レジストリキー
    pub key: String,
    /// 実ファイル (スキャンで登録された場合のみ)
    pub file: Option<PathBuf>,
}

/// 引数なしでビューを生成するローダー
pub type ViewLoader = Arc<dyn Fn() -> ViewComponent + Send + Sync>;

/// 利用可能なビューモジュールの静的レジストリ
///
/// キーは正規化済みのモジュールパス、値はそのビューを生成するローダー。
/// ルート構築中は読み取り専用で使う。
#[derive(Clone, Default)]
pub struct ViewRegistry {
    loaders: BTreeMap<String, ViewLoader>,
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("keys", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// キーとローダーを登録する
    pub fn register(&mut self, key: impl Into<String>, loader: ViewLoader) {
        self.loaders.insert(key.into(), loader);
    }

    /// キーだけを登録する (ローダーはキーを持つ ViewComponent を返す)
    pub fn register_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        let view = ViewComponent {
            key: key.clone(),
            file: None,
        };
        self.register(key, Arc::new(move || view.clone()));
    }

    /// views ディレクトリを再帰的に探索し、.vue / .tsx をすべて登録する
    ///
    /// キーは `/src/views/<相対パス>` の形に揃える。
    pub fn scan(views_dir: &Path) -> AppResult<Self> {
        let root = views_dir.absolutize()?.to_path_buf();
        let mut registry = ViewRegistry::new();

        for entry in WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file()
                    && e.path()
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| VIEW_EXTENSIONS.contains(&ext))
            })
        {
            let Ok(rel) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let key = format!("{VIEW_KEY_PREFIX}{rel}");
            let view = ViewComponent {
                key: key.clone(),
                file: Some(entry.path().to_path_buf()),
            };
            registry.register(key, Arc::new(move || view.clone()));
        }

        tracing::info!("ビューを {} 件登録しました: {:?}", registry.len(), root);
        Ok(registry)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.loaders.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// キーに対応するローダーを実行する
    pub fn load(&self, key: &str) -> Option<ViewComponent> {
        self.loaders.get(key).map(|loader| loader())
    }

    /// 候補パスをレジストリキーに解決する
    pub fn resolve(&self, component_or_path: &str) -> Option<String> {
        find_matching_component(component_or_path, &self.keys())
    }
}

/// モジュールのフルパスから比較用の相対パスを取り出す
///
/// 例: "/src/views/system/dict/index.vue" -> "system/dict/index"
///     "views/a/index" -> "a/index"
pub fn extract_module_path(full_path: &str) -> &str {
    let mut p = full_path.strip_prefix('/').unwrap_or(full_path);
    p = p.strip_prefix("src/").unwrap_or(p);
    p = p.strip_prefix("views/").unwrap_or(p);
    for ext in VIEW_EXTENSIONS {
        if let Some(stripped) = p.strip_suffix(ext).and_then(|s| s.strip_suffix('.')) {
            return stripped;
        }
    }
    p
}

/// コンポーネントパス (またはルートパス) に一致するレジストリキーを探す
///
/// 1) 完全一致 2) 末尾一致 3) 最後のセグメントによる曖昧一致 (候補が 1 件のときのみ)
/// の順に試し、最初に見つかったものを返す。
pub fn find_matching_component(
    component_or_path: &str,
    available_keys: &[&str],
) -> Option<String> {
    if component_or_path.is_empty() {
        return None;
    }

    // 先頭のスラッシュを除去
    let clean_path = component_or_path
        .strip_prefix('/')
        .unwrap_or(component_or_path);
    if clean_path.is_empty() {
        return None;
    }

    // 1) 完全一致
    let with_index = format!("{clean_path}/index");
    let exact = available_keys.iter().find(|key| {
        let module_path = extract_module_path(key);
        module_path == clean_path
            || module_path == with_index
            || module_path.strip_suffix("/index") == Some(clean_path)
    });
    if let Some(key) = exact {
        return Some(key.to_string());
    }

    // 2) 末尾一致
    let end = available_keys.iter().find(|key| {
        VIEW_EXTENSIONS.iter().any(|ext| {
            key.ends_with(&format!("{clean_path}.{ext}"))
                || key.ends_with(&format!("{clean_path}/index.{ext}"))
        })
    });
    if let Some(key) = end {
        tracing::warn!("末尾一致を使用: {} -> {}", clean_path, key);
        return Some(key.to_string());
    }

    // 3) 曖昧一致 (最後の手段)
    let last_segment = clean_path.rsplit('/').next().unwrap_or_default();
    if last_segment.is_empty() {
        return None;
    }
    let candidates: Vec<&str> = available_keys
        .iter()
        .copied()
        .filter(|key| key.contains(last_segment))
        .collect();

    match candidates.as_slice() {
        [only] => {
            tracing::warn!("曖昧一致を使用: {} -> {}", clean_path, only);
            Some(only.to_string())
        }
        [] => None,
        many => {
            tracing::error!("複数の候補コンポーネントが {} に一致: {:?}", clean_path, many);
            None
        }
    }
}
