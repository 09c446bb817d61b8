//! 会话状态管理 (Session Management)
//!
//! 一个客户端实例对应一个门户会话: 端点地址 (含路由符号)、Cookie 容器与最后成功时间。
//! 三者由客户端的同一把互斥锁保护，不存在全局共享状态。

use std::time::Duration;

use tokio::time::Instant;

use crate::network::address::EndpointAddress;
use crate::network::cookies::CookieJar;

#[derive(Debug)]
pub struct SessionState {
    pub address: EndpointAddress,
    pub jar: CookieJar,
    last_success: Option<Instant>,
    window: Duration,
}

impl SessionState {
    pub fn new(address: EndpointAddress, window: Duration) -> Self {
        Self {
            address,
            jar: CookieJar::new(),
            last_success: None,
            window,
        }
    }

    /// 会话有效: Cookie 非空、存在成功时间戳且距今未超过有效期
    pub fn is_valid(&self) -> bool {
        !self.jar.is_empty()
            && self
                .last_success
                .is_some_and(|at| at.elapsed() < self.window)
    }

    /// 标记本次请求成功
    pub fn touch(&mut self) {
        self.last_success = Some(Instant::now());
    }

    /// 悲观失效: 每次内容识别前调用，直到请求被证实成功
    pub fn invalidate(&mut self) {
        self.last_success = None;
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
