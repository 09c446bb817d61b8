//! 页面文档
//!
//! `scraper::Html` 不是 `Send`，无法跨 `.await` 持有，因此文档以原始正文保存，
//! 查询时再即时解析。

use scraper::{Html, Selector};

use crate::core::error::{PortalError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    url: String,
    body: String,
}

impl Document {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// 最终 URL (跟随重定向之后)
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// 匹配选择器的所有元素文本，按空白规整后以单个空格拼接
    pub fn select_text(&self, css: &str) -> Result<String> {
        let selector = Selector::parse(css).map_err(|e| PortalError::Selector(format!("{}: {:?}", css, e)))?;
        Ok(select_text(&self.html(), &selector))
    }

    pub fn title(&self) -> String {
        self.select_text("title").unwrap_or_default()
    }
}

pub(crate) fn select_text(html: &Html, selector: &Selector) -> String {
    html.select(selector)
        .flat_map(|el| el.text())
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_whitespace_normalised() {
        let doc = Document::new("https://a/", "<html><head><title>\n  Uczeń \n Start </title></head></html>");
        assert_eq!(doc.title(), "Uczeń Start");
    }

    #[test]
    fn select_text_joins_all_matches() {
        let doc = Document::new(
            "https://a/",
            r#"<div class="x">one</div><p>skip</p><div class="x"><b>two</b> three</div>"#,
        );
        assert_eq!(doc.select_text(".x").unwrap(), "one two three");
        assert_eq!(doc.select_text(".missing").unwrap(), "");
    }

    #[test]
    fn bad_selector_is_an_error() {
        let doc = Document::new("https://a/", "<p></p>");
        assert!(matches!(doc.select_text("<<"), Err(PortalError::Selector(_))));
    }
}
