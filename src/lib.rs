//! 会话感知的学校门户客户端
//!
//! 一次登录、多次复用会话，会话过期时自动重新认证，并依据页面内容区分
//! 维护中、会话失效与通用错误。

pub mod core;
pub mod interfaces;
pub mod network;

pub use crate::core::config::AppConfig;
pub use crate::core::error::{PortalError, Result};
pub use crate::interfaces::{Authenticator, CookieAuthenticator, Credentials, PortalRequest, PortalResponse, Transport};
pub use crate::network::{Document, EndpointAddress, FetchOptions, HttpService, Identity, LoginSession, PortalClient};
