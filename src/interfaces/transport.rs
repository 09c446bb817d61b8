//! 传输层接口
//!
//! 客户端只依赖此 Trait 完成一次出站 HTTP 交换，便于替换实现 (例如测试桩)。

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::Method;

use crate::core::error::Result;

/// 一次出站请求 (URL 已完成模板替换)
#[derive(Debug, Clone)]
pub struct PortalRequest {
    pub method: Method,
    pub url: String,
    /// 表单字段，保持调用方给出的顺序
    pub form: Vec<(String, String)>,
    /// 请求发出时的 Cookie 快照
    pub cookies: IndexMap<String, String>,
}

/// 一次交换的结果 (重定向已跟随完毕)
#[derive(Debug, Clone, Default)]
pub struct PortalResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    /// 重定向链上所有响应设置的 Cookie，按到达顺序排列
    pub cookies: Vec<(String, String)>,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 是否为可解析的标记文档 (HTML/XML)，缺失的 Content-Type 视为可解析
    pub fn is_markup(&self) -> bool {
        match &self.content_type {
            None => true,
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.starts_with("text/") || ct.contains("xml")
            }
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PortalRequest) -> Result<PortalResponse>;
}
