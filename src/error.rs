// src/error.rs
use thiserror::Error;

/// ルート構築パイプライン全体で使うエラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// ファイル入出力の失敗 (ルート JSON / ストレージ / 設定ファイル)
    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON のパース・シリアライズ失敗
    #[error("JSON エラー: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP 通信そのものの失敗
    #[error("HTTP エラー: {0}")]
    Http(#[from] reqwest::Error),

    /// サーバーが code != 0 を返した (セッションはログアウト済み)
    #[error("動的ルートの取得に失敗しました (code={code}): {message}")]
    FetchFailed { code: i64, message: String },

    /// 設定ファイルの内容が不正
    #[error("設定エラー: {0}")]
    Config(String),

    /// ローカルストレージの内容が不正
    #[error("ストレージエラー: {0}")]
    Storage(String),
}

pub type AppResult<T> = Result<T, AppError>;
