//! 登录接口
//!
//! 登录协商本身不属于客户端核心: 核心只负责在会话失效时清空 Cookie、
//! 调用一次 `Authenticator::login` 并采用其返回的路由符号。

use std::fmt;

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::debug;

use crate::core::error::{PortalError, Result};
use crate::network::client::LoginSession;

/// 登录凭据
#[derive(Clone)]
pub struct Credentials {
    login: String,
    password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// 外部登录操作
///
/// - 调用时会话已被锁定且 Cookie 已清空，登录过程中的请求应通过 `session` 发出，
///   以便 Cookie 进入同一个容器。
/// - 返回解析出的路由符号 (可能与猜测不同)；失败时返回 `PortalError::Authentication`。
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(
        &self,
        session: &mut LoginSession<'_>,
        credentials: &Credentials,
        symbol_guess: &str,
    ) -> Result<String>;
}

/// 以预置 Cookie 建立会话
///
/// 适用于已在浏览器中完成登录、只需复用其会话 Cookie 的场景。
#[derive(Debug, Clone, Default)]
pub struct CookieAuthenticator {
    cookies: IndexMap<String, String>,
    symbol: Option<String>,
}

impl CookieAuthenticator {
    pub fn new(cookies: IndexMap<String, String>) -> Self {
        Self { cookies, symbol: None }
    }

    /// 固定返回的路由符号，未设置时沿用猜测值
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

#[async_trait]
impl Authenticator for CookieAuthenticator {
    async fn login(
        &self,
        session: &mut LoginSession<'_>,
        _credentials: &Credentials,
        symbol_guess: &str,
    ) -> Result<String> {
        if self.cookies.is_empty() {
            return Err(PortalError::Authentication("no session cookies configured".into()));
        }

        session.add_cookies(self.cookies.clone());
        debug!("已注入 {} 个预置 Cookie", self.cookies.len());

        let symbol = self.symbol.clone().unwrap_or_else(|| symbol_guess.to_string());
        if symbol.is_empty() {
            return Err(PortalError::Authentication("routing symbol is unknown".into()));
        }
        Ok(symbol)
    }
}
