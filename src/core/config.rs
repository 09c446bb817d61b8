//! 配置管理系统 (Configuration Management)
//!
//! 负责 `config.toml` 的反序列化及其层级结构映射，支持环境变量与默认值回退机制。

use std::path::Path;
use std::time::Duration;

use bon::Builder;
use config::{Config, Environment, File};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::error::{PortalError, Result};

/// 全局应用配置
#[derive(Debug, Deserialize, Builder, Clone, Default)]
pub struct AppConfig {
    /// 门户账号与会话参数
    #[serde(default)]
    #[builder(default)]
    pub portal: PortalConfig,

    /// HTTP 传输层参数
    #[serde(default)]
    #[builder(default)]
    pub http: HttpConfig,

    /// 页面错误识别标记
    #[serde(default)]
    #[builder(default)]
    pub markers: MarkerConfig,
}

/// 门户账号配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct PortalConfig {
    /// 身份字符串: `protocol://host/symbol\alias\login` 或纯登录名
    #[serde(default)]
    #[builder(default)]
    pub identity: String,
    #[serde(default)]
    #[builder(default)]
    pub password: String,
    /// 初始路由符号猜测，可为空，由登录解析
    #[serde(default)]
    #[builder(default)]
    pub symbol: String,
    #[serde(default = "default_protocol")]
    #[builder(default = default_protocol())]
    pub protocol: String,
    #[serde(default = "default_host")]
    #[builder(default = default_host())]
    pub host: String,
    /// 会话有效期 (分钟)
    #[serde(default = "default_session_minutes")]
    #[builder(default = default_session_minutes())]
    pub session_minutes: u64,
    /// 预置会话 Cookie (供 `CookieAuthenticator` 使用)
    ///
    /// 以数组形式保存: 配置层会规整表键的大小写，而 Cookie 名称区分大小写。
    #[serde(default)]
    #[builder(default)]
    pub cookies: Vec<SessionCookie>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

/// 传输层配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    #[builder(default = default_user_agent())]
    pub user_agent: String,
    /// 连接超时 (秒)，未设置时使用底层默认值
    pub connect_timeout_secs: Option<u64>,
    /// 整体请求超时 (秒)，未设置时使用底层默认值
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_max_redirects")]
    #[builder(default = default_max_redirects())]
    pub max_redirects: usize,
}

/// 错误页识别标记
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct MarkerConfig {
    /// 维护页标题
    #[serde(default = "default_offline_title")]
    #[builder(default = default_offline_title())]
    pub offline_title: String,
    /// 登录按钮文本
    #[serde(default = "default_sign_in_label")]
    #[builder(default = default_sign_in_label())]
    pub sign_in_label: String,
    /// 通用错误页标题
    #[serde(default = "default_error_title")]
    #[builder(default = default_error_title())]
    pub error_title: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            identity: String::new(),
            password: String::new(),
            symbol: String::new(),
            protocol: default_protocol(),
            host: default_host(),
            session_minutes: default_session_minutes(),
            cookies: Vec::new(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: None,
            timeout_secs: None,
            max_redirects: default_max_redirects(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            offline_title: default_offline_title(),
            sign_in_label: default_sign_in_label(),
            error_title: default_error_title(),
        }
    }
}

fn default_protocol() -> String {
    "https".to_string()
}
fn default_host() -> String {
    "vulcan.net.pl".to_string()
}
fn default_session_minutes() -> u64 {
    29
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_max_redirects() -> usize {
    10
}
fn default_offline_title() -> String {
    "Przerwa techniczna".to_string()
}
fn default_sign_in_label() -> String {
    "Zaloguj się".to_string()
}
fn default_error_title() -> String {
    "Błąd strony".to_string()
}

impl PortalConfig {
    pub fn session_window(&self) -> Duration {
        Duration::from_secs(self.session_minutes * 60)
    }

    pub fn cookie_map(&self) -> IndexMap<String, String> {
        self.cookies
            .iter()
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect()
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// 从文件系统中加载并解析配置
    ///
    /// 环境变量 `PORTAL__SECTION__KEY` 覆盖文件中的同名项。
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let builder = Config::builder();

        let builder = if config_path.exists() {
            builder.add_source(File::from(config_path))
        } else {
            builder
        };

        let settings = builder
            .add_source(Environment::with_prefix("PORTAL").separator("__"))
            .build()
            .map_err(PortalError::Config)?;
        settings.try_deserialize().map_err(PortalError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_portal() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.portal.protocol, "https");
        assert_eq!(cfg.portal.host, "vulcan.net.pl");
        assert_eq!(cfg.portal.session_window(), Duration::from_secs(29 * 60));
        assert_eq!(cfg.http.max_redirects, 10);
        assert!(cfg.http.timeout().is_none());
        assert_eq!(cfg.markers.sign_in_label, "Zaloguj się");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = AppConfig::load_from(Path::new("definitely-not-here.toml")).unwrap();
        assert_eq!(cfg.portal.session_minutes, 29);
        assert!(cfg.portal.cookies.is_empty());
    }

    #[test]
    fn cookie_entries_keep_name_case() {
        let path = std::env::temp_dir().join(format!("portal-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[portal]
identity = 'https://vulcan.net.pl/gmina\alias\jan@example.com'
session_minutes = 10

[[portal.cookies]]
name = "ASP.NET_SessionId"
value = "AbC"
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cfg.portal.session_minutes, 10);
        assert_eq!(cfg.portal.host, "vulcan.net.pl");
        assert_eq!(cfg.portal.cookie_map().get("ASP.NET_SessionId").map(String::as_str), Some("AbC"));
    }

    #[test]
    fn builder_fills_unset_fields() {
        let portal = PortalConfig::builder()
            .identity("user@example.com".to_string())
            .session_minutes(5)
            .build();
        assert_eq!(portal.host, "vulcan.net.pl");
        assert_eq!(portal.session_window(), Duration::from_secs(300));
    }
}
