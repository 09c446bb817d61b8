use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, LOCATION};
use reqwest::{Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use tracing::debug;
use url::Url;

use crate::core::config::HttpConfig;
use crate::core::error::{PortalError, Result};
use crate::interfaces::transport::{PortalRequest, PortalResponse, Transport};
use crate::network::cookies::header_value;
use crate::network::middleware::TraceMiddleware;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// 基于 reqwest 的传输实现
///
/// 底层客户端不自动跟随重定向，也不启用自带的 Cookie 存储: 重定向在 `execute`
/// 中逐跳处理，每一跳都携带最新 Cookie 并收集 `Set-Cookie`。
#[derive(Clone)]
pub struct HttpService {
    client: ClientWithMiddleware,
    max_redirects: usize,
}

impl HttpService {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none());

        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(PortalError::Network)?;

        Ok(Self {
            client: ClientBuilder::new(client).with(TraceMiddleware).build(),
            max_redirects: config.max_redirects,
        })
    }
}

/// 重定向后的请求方法: 307/308 保持原方法与表单，其余一律改为 GET
fn redirect_method(status: StatusCode, method: &Method) -> Method {
    match status {
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => method.clone(),
        _ => Method::GET,
    }
}

#[async_trait]
impl Transport for HttpService {
    async fn execute(&self, request: PortalRequest) -> Result<PortalResponse> {
        let PortalRequest {
            mut method,
            url: start_url,
            mut form,
            cookies: mut jar,
        } = request;

        let mut url = Url::parse(&start_url)?;
        let mut collected = Vec::new();

        for _ in 0..=self.max_redirects {
            let mut rb = self.client.request(method.clone(), url.clone());
            if !jar.is_empty() {
                rb = rb.header(COOKIE, header_value(&jar));
            }
            if method == Method::POST {
                rb = rb
                    .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                    .body(serde_urlencoded::to_string(&form)?);
            }

            let resp = rb.send().await.map_err(PortalError::Middleware)?;

            let hop: Vec<(String, String)> = resp
                .cookies()
                .map(|c| (c.name().to_string(), c.value().to_string()))
                .collect();
            jar.extend(hop.iter().cloned());
            collected.extend(hop);

            let status = resp.status();
            if status.is_redirection()
                && let Some(location) = resp.headers().get(LOCATION)
            {
                let location = String::from_utf8_lossy(location.as_bytes()).to_string();
                let next = url.join(&location)?;
                debug!("重定向: {} -> {}", url, next);

                let next_method = redirect_method(status, &method);
                if next_method != method {
                    form.clear();
                }
                method = next_method;
                url = next;
                continue;
            }

            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let final_url = resp.url().to_string();
            let body = resp.text().await.map_err(PortalError::Network)?;

            return Ok(PortalResponse {
                url: final_url,
                status: status.as_u16(),
                content_type,
                body,
                cookies: collected,
            });
        }

        Err(PortalError::Custom(format!(
            "too many redirects (> {}) starting at {}",
            self.max_redirects, start_url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn see_other_downgrades_to_get() {
        assert_eq!(redirect_method(StatusCode::FOUND, &Method::POST), Method::GET);
        assert_eq!(redirect_method(StatusCode::SEE_OTHER, &Method::POST), Method::GET);
        assert_eq!(redirect_method(StatusCode::MOVED_PERMANENTLY, &Method::GET), Method::GET);
    }

    #[test]
    fn temporary_redirect_keeps_method() {
        assert_eq!(redirect_method(StatusCode::TEMPORARY_REDIRECT, &Method::POST), Method::POST);
        assert_eq!(redirect_method(StatusCode::PERMANENT_REDIRECT, &Method::POST), Method::POST);
    }
}
