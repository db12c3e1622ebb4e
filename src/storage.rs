// src/storage.rs
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::model::DataInfo;

/// 動的ルートのキャッシュキー
pub const ASYNC_ROUTES_KEY: &str = "async-routes";
/// ログインユーザー情報のキー
pub const USER_KEY: &str = "user-info";

/// JSON ファイルに永続化されるキー・バリューストア
///
/// `path` が None の場合はメモリ上だけで保持する。
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    items: Map<String, Value>,
}

impl LocalStorage {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// ファイルを開く。存在しなければ空のストアとして扱う
    pub fn open(path: &Path) -> AppResult<Self> {
        let items = if path.exists() {
            let src = fs::read_to_string(path)?;
            if src.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&src)? {
                    Value::Object(map) => map,
                    other => {
                        return Err(AppError::Storage(format!(
                            "ストレージのルートがオブジェクトではありません: {other}"
                        )));
                    }
                }
            }
        } else {
            Map::new()
        };
        tracing::debug!("ストレージを開きました: {:?} ({} 件)", path, items.len());
        Ok(LocalStorage {
            path: Some(path.to_path_buf()),
            items,
        })
    }

    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.items.get(key) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    pub fn set_item<T: Serialize>(&mut self, key: &str, value: &T) -> AppResult<()> {
        self.items.insert(key.to_string(), serde_json::to_value(value)?);
        self.flush()
    }

    pub fn remove_item(&mut self, key: &str) -> AppResult<()> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> AppResult<()> {
        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_string_pretty(&self.items)?)?;
        }
        Ok(())
    }
}

/// 保存されているログインユーザー情報を返す
pub fn get_user_info(storage: &LocalStorage) -> AppResult<Option<DataInfo>> {
    storage.get_item(USER_KEY)
}

pub fn set_user_info(storage: &mut LocalStorage, info: &DataInfo) -> AppResult<()> {
    storage.set_item(USER_KEY, info)
}

/// 現在のユーザーのロール。記録が無ければ空
pub fn current_roles(storage: &LocalStorage) -> Vec<String> {
    match get_user_info(storage) {
        Ok(info) => info.map(|i| i.roles).unwrap_or_default(),
        Err(e) => {
            tracing::warn!("ユーザー情報を読み込めません: {}", e);
            Vec::new()
        }
    }
}

/// ログイン情報を破棄する
pub fn remove_token(storage: &mut LocalStorage) -> AppResult<()> {
    storage.remove_item(USER_KEY)
}
