//! 错误处理体系 (Error Handling System)
//!
//! 门户客户端的统一错误类型与全局 Result 别名。
//! 门户本身没有结构化的错误通道，`Offline` / `NotLoggedIn` / `Portal` 三类
//! 均来自页面内容识别 (见 `network::classifier`)。

use thiserror::Error;

/// 全局错误定义 (Portal Domain Errors)
#[derive(Error, Debug)]
pub enum PortalError {
    /// 门户处于维护状态 (技术中断页)
    #[error("Portal offline: {0}")]
    Offline(String),

    /// 会话已失效，页面要求重新登录
    #[error("Not logged in: {0}")]
    NotLoggedIn(String),

    /// 门户返回了通用错误页
    #[error("Portal error: {0}")]
    Portal(String),

    /// 外部登录流程失败 (凭据被拒绝或无法解析路由符号)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Unsupported content type {content_type:?} for {url}")]
    UnsupportedContent { content_type: String, url: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Other error: {0}")]
    Custom(String),
}

/// 全局 Result 别名
pub type Result<T> = std::result::Result<T, PortalError>;

impl PortalError {
    /// 会话是否已丢失
    ///
    /// 调用方据此重新发起逻辑操作，下一次带登录检查的请求会自动重新认证。
    pub fn is_session_lost(&self) -> bool {
        matches!(self, PortalError::NotLoggedIn(_))
    }

    /// 是否属于可由调用方自行决定重试的暂时性故障
    ///
    /// 支持中间件嵌套错误的分层解包 (Downcasting)。
    pub fn is_retryable(&self) -> bool {
        match self {
            PortalError::Offline(_) | PortalError::Network(_) => true,
            PortalError::Middleware(reqwest_middleware::Error::Reqwest(_)) => true,
            PortalError::Middleware(reqwest_middleware::Error::Middleware(anyhow_err)) => anyhow_err
                .downcast_ref::<PortalError>()
                .is_some_and(|e| e.is_retryable()),
            PortalError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classified_errors_expose_their_kind() {
        assert!(PortalError::NotLoggedIn("Zaloguj się".into()).is_session_lost());
        assert!(!PortalError::Offline("Przerwa techniczna".into()).is_session_lost());

        assert!(PortalError::Offline("Przerwa techniczna".into()).is_retryable());
        assert!(!PortalError::Portal("Błąd strony".into()).is_retryable());
        assert!(!PortalError::Authentication("bad password".into()).is_retryable());
    }

    #[test]
    fn server_side_statuses_are_retryable() {
        let err = PortalError::HttpStatus { status: 503, url: "https://a/b".into() };
        assert!(err.is_retryable());
        let err = PortalError::HttpStatus { status: 404, url: "https://a/b".into() };
        assert!(!err.is_retryable());
    }

    #[test]
    fn nested_middleware_errors_are_unwrapped() {
        let inner = PortalError::Offline("Przerwa techniczna".into());
        let err = PortalError::Middleware(reqwest_middleware::Error::Middleware(anyhow::Error::new(inner)));
        assert!(err.is_retryable());
    }
}
