//! 页面内容识别 (Response Classifier)
//!
//! 门户的错误页与正常页一样返回 200，只能依据标题与登录按钮文本识别。
//! 识别是纯函数，返回带标签的结果，由调用方决定如何处置。

use std::sync::OnceLock;

use scraper::Selector;
use strum::AsRefStr;

use crate::core::config::MarkerConfig;
use crate::core::error::PortalError;
use crate::network::document::{Document, select_text};

/// 识别结果
#[derive(Debug, Clone, PartialEq, Eq, AsRefStr)]
pub enum Outcome {
    Success,
    /// 维护页，携带页面标题
    PortalOffline(String),
    /// 页面要求登录，携带按钮文本
    SessionInvalid(String),
    /// 通用错误页，携带页面标题
    GenericError(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// 成功时原样放行文档，否则转为对应错误
    pub fn into_result(self, doc: Document) -> Result<Document, PortalError> {
        match self {
            Outcome::Success => Ok(doc),
            Outcome::PortalOffline(title) => Err(PortalError::Offline(title)),
            Outcome::SessionInvalid(marker) => Err(PortalError::NotLoggedIn(marker)),
            Outcome::GenericError(title) => Err(PortalError::Portal(title)),
        }
    }
}

struct ClassifierSelectors {
    title: Selector,
    login_button: Selector,
}

static SELECTORS: OnceLock<ClassifierSelectors> = OnceLock::new();

impl ClassifierSelectors {
    fn get() -> &'static ClassifierSelectors {
        SELECTORS.get_or_init(|| ClassifierSelectors {
            title: Selector::parse("title").unwrap(),
            login_button: Selector::parse(".loginButton").unwrap(),
        })
    }
}

/// 错误页识别器
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    markers: MarkerConfig,
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(MarkerConfig::default())
    }
}

impl ResponseClassifier {
    pub fn new(markers: MarkerConfig) -> Self {
        Self { markers }
    }

    /// 按顺序匹配，首个命中即返回: 维护页 > 登录按钮 > 通用错误页 > 成功
    pub fn classify(&self, doc: &Document) -> Outcome {
        let selectors = ClassifierSelectors::get();
        let html = doc.html();

        let title = select_text(&html, &selectors.title);
        if title == self.markers.offline_title {
            return Outcome::PortalOffline(title);
        }

        let sign_in = select_text(&html, &selectors.login_button);
        if sign_in == self.markers.sign_in_label {
            return Outcome::SessionInvalid(sign_in);
        }

        if title == self.markers.error_title {
            return Outcome::GenericError(title);
        }

        Outcome::Success
    }
}
