//! 应用程序入口 (Application Entrypoint)
//!
//! 负责 CLI 指令解析、遥测层初始化与客户端装配。

use std::sync::Arc;

use clap::{Parser, Subcommand};

use portal::network::address::{EndpointAddress, Identity};
use portal::{AppConfig, CookieAuthenticator, HttpService, PortalClient};

/// 命令行界面脚手架 (CLI Scaffolding)
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 获取页面并输出标题与正文 (检查登录与错误页)
    Get {
        /// URL 模板，可包含 {schema} {host} {symbol}
        url: String,
    },
    /// 获取原始正文 (如 JSON)，不做错误页识别
    Raw { url: String },
    /// 提交表单并输出返回页面
    Post {
        url: String,
        /// 表单字段 (KEY=VALUE)，按给出顺序提交
        #[arg(short, long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
    },
    /// 解析身份字符串并展示生效的端点
    Identity { identity: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 遥测层初始化 (Telemetry Layer Initialization)
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let config = AppConfig::load()?;
    let cli = Cli::parse();

    if let Commands::Identity { identity } = &cli.command {
        let parsed = Identity::parse(identity);
        let defaults = EndpointAddress::new(
            config.portal.protocol.as_str(),
            config.portal.host.as_str(),
            config.portal.symbol.as_str(),
        );
        let address = EndpointAddress::from_identity(&parsed, defaults);
        println!("{:#?}", parsed);
        println!("{}", address.fill("{schema}://uonetplus.{host}/{symbol}/"));
        return Ok(());
    }

    let transport = Arc::new(HttpService::new(&config.http)?);
    let authenticator = Arc::new(CookieAuthenticator::new(config.portal.cookie_map()));
    let client = PortalClient::from_config(&config, transport, authenticator);

    match cli.command {
        Commands::Get { url } => {
            let doc = client.get_document(&url).await?;
            println!("{}", doc.title());
            println!("{}", doc.body());
        }
        Commands::Raw { url } => {
            println!("{}", client.get_raw(&url).await?);
        }
        Commands::Post { url, fields } => {
            let doc = client.post_document(&url, fields).await?;
            println!("{}", doc.title());
            println!("{}", doc.body());
        }
        Commands::Identity { .. } => {}
    }

    tracing::info!("Finished, routing symbol: {}", client.symbol().await);
    Ok(())
}

/// 执行 KEY=VALUE 格式参数解析
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no = found in {}", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}
