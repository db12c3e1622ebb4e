// src/source.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppResult;
use crate::model::AsyncRoutesResponse;
use crate::parser::parse_routes_in_file;

/// 動的ルートの取得元
pub trait RouteSource {
    fn get_async_routes(&self) -> AppResult<AsyncRoutesResponse>;
}

/// `GET {base}/get-async-routes` を呼び出す HTTP の取得元
pub struct HttpRouteSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpRouteSource {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(HttpRouteSource {
            base_url: base_url.into(),
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/get-async-routes", self.base_url.trim_end_matches('/'))
    }
}

impl RouteSource for HttpRouteSource {
    fn get_async_routes(&self) -> AppResult<AsyncRoutesResponse> {
        let url = self.url();
        tracing::info!("動的ルートを取得: {}", url);
        let resp = self.client.get(&url).send()?.error_for_status()?;
        Ok(resp.json::<AsyncRoutesResponse>()?)
    }
}

/// JSON ファイルから読み込む取得元
pub struct FileRouteSource {
    path: PathBuf,
}

impl FileRouteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileRouteSource { path: path.into() }
    }
}

impl RouteSource for FileRouteSource {
    fn get_async_routes(&self) -> AppResult<AsyncRoutesResponse> {
        parse_routes_in_file(&self.path)
    }
}
