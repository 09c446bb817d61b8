//! 门户客户端 (Portal Client)
//!
//! 每个操作都在同一把异步互斥锁内完成 "登录检查 → Cookie 注入 → 出站请求 →
//! 合并响应 Cookie → 内容识别" 整个序列，避免:
//! - 某个调用触发的重新登录清空了另一个进行中调用所依赖的 Cookie；
//! - 两个并发登录竞相改写路由符号。

use std::sync::Arc;
use std::time::Duration;

use bon::{Builder, bon};
use indexmap::IndexMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::config::{AppConfig, MarkerConfig};
use crate::core::error::{PortalError, Result};
use crate::interfaces::auth::{Authenticator, Credentials};
use crate::interfaces::transport::{PortalRequest, PortalResponse, Transport};
use crate::network::address::{EndpointAddress, Identity};
use crate::network::classifier::ResponseClassifier;
use crate::network::cookies::CookieJar;
use crate::network::document::Document;
use crate::network::session::SessionState;

const DEFAULT_SESSION_WINDOW: Duration = Duration::from_secs(29 * 60);

/// GET 文档请求选项
#[derive(Debug, Clone, Builder)]
pub struct FetchOptions {
    /// 请求前是否检查登录状态；只有检查过的请求成功后才会刷新会话时间
    #[builder(default = true)]
    pub gate: bool,
    /// 请求前注入的额外 Cookie
    pub cookies: Option<IndexMap<String, String>>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            gate: true,
            cookies: None,
        }
    }
}

struct ClientInner {
    state: Mutex<SessionState>,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
    authenticator: Arc<dyn Authenticator>,
    classifier: ResponseClassifier,
}

/// 会话感知的门户客户端
///
/// 克隆得到的实例共享同一个会话。
#[derive(Clone)]
pub struct PortalClient {
    inner: Arc<ClientInner>,
}

#[bon]
impl PortalClient {
    #[builder]
    pub fn new(
        // 身份字符串: `protocol://host/symbol\alias\login` 或纯登录名
        #[builder(into)]
        identity: String,
        #[builder(into, default)] password: String,
        transport: Arc<dyn Transport>,
        authenticator: Arc<dyn Authenticator>,
        // 身份字符串未给出端点时使用的默认值
        #[builder(default = EndpointAddress::new("https", "vulcan.net.pl", ""))]
        defaults: EndpointAddress,
        #[builder(default = DEFAULT_SESSION_WINDOW)] session_window: Duration,
        #[builder(default)] markers: MarkerConfig,
    ) -> Self {
        let parsed = Identity::parse(&identity);
        if parsed.is_malformed() {
            warn!("身份字符串格式不完整，沿用默认端点: {}", defaults);
        }
        let address = EndpointAddress::from_identity(&parsed, defaults);

        Self {
            inner: Arc::new(ClientInner {
                state: Mutex::new(SessionState::new(address, session_window)),
                credentials: Credentials::new(parsed.login(), password),
                transport,
                authenticator,
                classifier: ResponseClassifier::new(markers),
            }),
        }
    }
}

impl PortalClient {
    /// 由应用配置构建客户端
    pub fn from_config(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let portal = &config.portal;
        Self::builder()
            .identity(portal.identity.as_str())
            .password(portal.password.as_str())
            .transport(transport)
            .authenticator(authenticator)
            .defaults(EndpointAddress::new(
                portal.protocol.as_str(),
                portal.host.as_str(),
                portal.symbol.as_str(),
            ))
            .session_window(portal.session_window())
            .markers(config.markers.clone())
            .build()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    // =========================================================================
    // 请求操作
    // =========================================================================

    /// GET 文档 (检查登录，成功后刷新会话时间)
    pub async fn get_document(&self, url: &str) -> Result<Document> {
        self.get_document_with(url, FetchOptions::default()).await
    }

    pub async fn get_document_with(&self, url: &str, options: FetchOptions) -> Result<Document> {
        let mut state = self.inner.state.lock().await;

        if options.gate {
            self.ensure_logged_in(&mut state).await?;
        }
        if let Some(cookies) = options.cookies {
            state.jar.merge(cookies);
        }

        let doc = self
            .exchange_document(&mut state, Method::GET, url, Vec::new())
            .await?;

        if options.gate {
            state.touch();
        }
        Ok(doc)
    }

    /// POST 表单并返回文档
    ///
    /// 不检查登录也不刷新会话时间；会话失效会被识别为 `NotLoggedIn`。
    pub async fn post_document<I, K, V>(&self, url: &str, form: I) -> Result<Document>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let form = collect_form(form);
        let mut state = self.inner.state.lock().await;
        self.exchange_document(&mut state, Method::POST, url, form).await
    }

    /// GET 原始正文 (如 JSON)，总是先检查登录，不做内容识别
    pub async fn get_raw(&self, url: &str) -> Result<String> {
        let mut state = self.inner.state.lock().await;
        self.ensure_logged_in(&mut state).await?;
        self.exchange_raw(&mut state, Method::GET, url, Vec::new()).await
    }

    /// POST 表单并返回原始正文，总是先检查登录，不做内容识别
    pub async fn post_raw<I, K, V>(&self, url: &str, form: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let form = collect_form(form);
        let mut state = self.inner.state.lock().await;
        self.ensure_logged_in(&mut state).await?;
        self.exchange_raw(&mut state, Method::POST, url, form).await
    }

    /// GET 并按 JSON 反序列化
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_raw(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // 会话访问
    // =========================================================================

    pub async fn add_cookies(&self, items: IndexMap<String, String>) {
        self.inner.state.lock().await.jar.merge(items);
    }

    pub async fn cookies(&self) -> CookieJar {
        self.inner.state.lock().await.jar.clone()
    }

    pub async fn symbol(&self) -> String {
        self.inner.state.lock().await.address.symbol().to_string()
    }

    pub async fn set_symbol(&self, symbol: impl Into<String>) {
        self.inner.state.lock().await.address.set_symbol(symbol);
    }

    pub async fn host(&self) -> String {
        self.inner.state.lock().await.address.host().to_string()
    }

    pub async fn fill_url(&self, template: &str) -> String {
        self.inner.state.lock().await.address.fill(template)
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.state.lock().await.is_valid()
    }

    // =========================================================================
    // 内部流程 (调用方已持有会话锁)
    // =========================================================================

    /// 登录检查: 会话有效时不做任何事
    async fn ensure_logged_in(&self, state: &mut SessionState) -> Result<()> {
        if state.is_valid() {
            return Ok(());
        }

        state.jar.reset();
        let guess = state.address.symbol().to_string();
        info!("会话无效，正在登录 {} ...", self.inner.credentials.login());

        let symbol = {
            let mut session = LoginSession {
                client: self,
                state: &mut *state,
            };
            self.inner
                .authenticator
                .login(&mut session, &self.inner.credentials, &guess)
                .await?
        };

        if symbol != guess {
            info!("路由符号已解析: {:?} -> {:?}", guess, symbol);
        }
        state.address.set_symbol(symbol);
        Ok(())
    }

    async fn exchange(
        &self,
        state: &mut SessionState,
        method: Method,
        url: &str,
        form: Vec<(String, String)>,
    ) -> Result<PortalResponse> {
        let request = PortalRequest {
            method,
            url: state.address.fill(url),
            form,
            cookies: state.jar.snapshot(),
        };
        debug!("{} {}", request.method, request.url);

        let response = self.inner.transport.execute(request).await?;
        state.jar.merge(response.cookies.iter().cloned());

        if !response.is_success() {
            return Err(PortalError::HttpStatus {
                status: response.status,
                url: response.url,
            });
        }
        Ok(response)
    }

    async fn exchange_document(
        &self,
        state: &mut SessionState,
        method: Method,
        url: &str,
        form: Vec<(String, String)>,
    ) -> Result<Document> {
        let response = self.exchange(state, method, url, form).await?;
        if !response.is_markup() {
            return Err(PortalError::UnsupportedContent {
                content_type: response.content_type.unwrap_or_default(),
                url: response.url,
            });
        }

        let doc = Document::new(response.url, response.body);
        state.invalidate();

        let outcome = self.inner.classifier.classify(&doc);
        if !outcome.is_success() {
            warn!("页面识别为 {}: {}", outcome.as_ref(), doc.url());
        }
        outcome.into_result(doc)
    }

    async fn exchange_raw(
        &self,
        state: &mut SessionState,
        method: Method,
        url: &str,
        form: Vec<(String, String)>,
    ) -> Result<String> {
        let response = self.exchange(state, method, url, form).await?;
        Ok(response.body)
    }
}

fn collect_form<I, K, V>(form: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    form.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// 登录期间的会话句柄
///
/// 由 `Authenticator::login` 使用。客户端锁已被持有，通过句柄发出的请求
/// 不会再次检查登录，也不会刷新会话时间。
pub struct LoginSession<'a> {
    client: &'a PortalClient,
    state: &'a mut SessionState,
}

impl LoginSession<'_> {
    pub fn address(&self) -> &EndpointAddress {
        &self.state.address
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.state.jar
    }

    pub fn add_cookies<I, K, V>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.state.jar.merge(items);
    }

    /// GET 文档并做内容识别，可附带额外 Cookie
    pub async fn get_document(
        &mut self,
        url: &str,
        cookies: Option<IndexMap<String, String>>,
    ) -> Result<Document> {
        if let Some(cookies) = cookies {
            self.state.jar.merge(cookies);
        }
        self.client
            .exchange_document(self.state, Method::GET, url, Vec::new())
            .await
    }

    pub async fn post_document<I, K, V>(&mut self, url: &str, form: I) -> Result<Document>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.client
            .exchange_document(self.state, Method::POST, url, collect_form(form))
            .await
    }

    /// GET 原始正文 (登录表单页等不应被识别为错误的页面)
    pub async fn get_raw(&mut self, url: &str) -> Result<String> {
        self.client
            .exchange_raw(self.state, Method::GET, url, Vec::new())
            .await
    }

    pub async fn post_raw<I, K, V>(&mut self, url: &str, form: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.client
            .exchange_raw(self.state, Method::POST, url, collect_form(form))
            .await
    }
}
