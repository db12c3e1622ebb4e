// src/config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// platform-config.json の内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatformConfig {
    /// 動的ルートをローカルストレージにキャッシュするか
    #[serde(default)]
    pub caching_async_routes: bool,

    /// 動的ルート API のベース URL (例: "http://localhost:8848/api")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url_api: Option<String>,
}

impl PlatformConfig {
    /// 設定ファイルを読み込む。ファイルが無ければ既定値を返す
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            tracing::info!("設定ファイルが無いため既定値を使用: {:?}", path);
            return Ok(Self::default());
        }
        let src = fs::read_to_string(path)?;
        serde_json::from_str(&src)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }
}
