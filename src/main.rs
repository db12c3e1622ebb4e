// src/main.rs

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use admin_route_builder::config::PlatformConfig;
use admin_route_builder::modules::constant_routes;
use admin_route_builder::resolver::ViewRegistry;
use admin_route_builder::router::{PermissionStore, RouteRegistry, RouterService};
use admin_route_builder::source::{FileRouteSource, HttpRouteSource, RouteSource};
use admin_route_builder::storage::LocalStorage;
use admin_route_builder::tree::{format_two_stage_routes, get_top_menu};

/// 出力する内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// 登録済みのルート表
    Routes,
    /// ルート設定 "/" の children
    Flat,
    /// 権限・表示フィルタ後のメニュー
    Menus,
    /// 平坦化したルートを二階層に組み直したもの
    TwoStage,
    /// 最初に表示するメニュー
    TopMenu,
}

/// CLI 引数定義
#[derive(Parser, Debug)]
#[command(
    name = "Admin Route Builder",
    version = "0.1.0",
    about = "サーバーから返されたメニューを動的ルートに組み立てて JSON 出力する CLI ツール"
)]
struct Cli {
    /// ビューファイル (.vue / .tsx) が置かれたディレクトリ
    #[arg(short = 'd', long = "views-dir", value_name = "DIR")]
    views_dir: PathBuf,

    /// 動的ルートを JSON ファイルから読み込む
    #[arg(short = 'r', long = "routes", value_name = "FILE", conflicts_with = "api")]
    routes: Option<PathBuf>,

    /// 動的ルート API のベース URL (省略時は設定ファイルの BaseUrlApi)
    #[arg(short = 'a', long = "api", value_name = "URL")]
    api: Option<String>,

    /// ローカルストレージとして使う JSON ファイル
    #[arg(short = 's', long = "storage", value_name = "FILE", default_value = "local-storage.json")]
    storage: PathBuf,

    /// platform-config.json のパス
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        default_value = "platform-config.json"
    )]
    config: PathBuf,

    /// 出力内容
    #[arg(short = 'p', long = "print", value_enum, default_value_t = Output::Menus)]
    print: Output,

    /// ルート構築は行わず、候補パスに一致するビューだけを表示する
    #[arg(long = "resolve", value_name = "PATH")]
    resolve: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) ログ出力 (stdout は JSON 用に空けておく)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 2) ビューのレジストリを作る
    let views = ViewRegistry::scan(&cli.views_dir)?;

    if let Some(candidate) = &cli.resolve {
        match views.resolve(candidate).and_then(|key| views.load(&key)) {
            Some(view) => match &view.file {
                Some(file) => println!("{} ({})", view.key, file.display()),
                None => println!("{}", view.key),
            },
            None => {
                eprintln!("Error: {candidate} に一致するビューが見つかりませんでした。");
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // 3) 設定・ストレージ・取得元を準備
    let config = PlatformConfig::load(&cli.config)?;
    let storage = LocalStorage::open(&cli.storage)?;
    let api = cli.api.as_ref().or(config.base_url_api.as_ref());
    let source: Box<dyn RouteSource> = match (&cli.routes, api) {
        (Some(path), _) => Box::new(FileRouteSource::new(path)),
        (None, Some(url)) => Box::new(HttpRouteSource::new(url.as_str())?),
        (None, None) => {
            eprintln!("Error: --routes か --api (または BaseUrlApi) を指定してください。");
            std::process::exit(2);
        }
    };

    // 4) ルートを初期化
    let modules = constant_routes();
    let mut service = RouterService::new(
        RouteRegistry::from_constant_routes(&modules),
        PermissionStore::new(&modules),
        views,
        storage,
        config,
    );
    service.init_router(source.as_ref())?;

    // 5) 結果を JSON 化して標準出力
    let json = match cli.print {
        Output::Routes => serde_json::to_string_pretty(service.registry().get_routes())?,
        Output::Flat => serde_json::to_string_pretty(service.registry().root_children())?,
        Output::Menus => serde_json::to_string_pretty(service.permissions().whole_menus())?,
        Output::TwoStage => serde_json::to_string_pretty(&format_two_stage_routes(
            service.permissions().flattening_routes(),
        ))?,
        Output::TopMenu => {
            serde_json::to_string_pretty(&get_top_menu(service.permissions().whole_menus()))?
        }
    };
    println!("{}", json);

    Ok(())
}
