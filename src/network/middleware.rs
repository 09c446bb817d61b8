use std::time::Instant;

use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::{debug, warn};

/// 请求追踪中间件
/// 记录每一跳出站请求的方法、地址、状态与耗时 (不含 Cookie 与表单内容)
pub struct TraceMiddleware;

#[async_trait::async_trait]
impl Middleware for TraceMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();
        let started = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(resp) => debug!(%method, %url, status = resp.status().as_u16(), elapsed_ms, "portal request"),
            Err(e) => warn!(%method, %url, elapsed_ms, "portal request failed: {}", e),
        }

        result
    }
}
