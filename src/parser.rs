use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::AppResult;
use crate::model::{AsyncRoutesResponse, RouteNode};

/// `children` を寛容にデシリアライズする
///
/// 配列以外 (null, オブジェクト, 文字列など) は子なしとみなす。
pub fn lenient_children<'de, D>(deserializer: D) -> Result<Vec<RouteNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        other => {
            if !other.is_null() {
                tracing::warn!("children が配列ではないため無視します: {}", other);
            }
            Ok(Vec::new())
        }
    }
}

/// ルート配列の JSON 文字列を解析する
pub fn parse_routes(src: &str) -> AppResult<Vec<RouteNode>> {
    let routes: Vec<RouteNode> = serde_json::from_str(src)?;
    tracing::debug!("ルート配列を解析: {} 件", routes.len());
    Ok(routes)
}

/// `{ code, message, data }` 形式のレスポンス JSON を解析する
pub fn parse_response(src: &str) -> AppResult<AsyncRoutesResponse> {
    let resp: AsyncRoutesResponse = serde_json::from_str(src)?;
    tracing::debug!(
        "レスポンスを解析: code={}, data={} 件",
        resp.code,
        resp.data.len()
    );
    Ok(resp)
}

/// ファイルからルート定義を読み込む
///
/// レスポンス形式 (`{ code, message, data }`) と素の配列の両方を受け付ける。
pub fn parse_routes_in_file(file_path: &Path) -> AppResult<AsyncRoutesResponse> {
    tracing::info!("ルートファイル読み込み: {:?}", file_path);
    let src = fs::read_to_string(file_path)?;

    if src.trim_start().starts_with('[') {
        let data = parse_routes(&src)?;
        return Ok(AsyncRoutesResponse {
            code: 0,
            message: String::new(),
            data,
        });
    }
    parse_response(&src)
}
