//! 会话 Cookie 容器
//!
//! 覆盖式合并: 同名 Cookie 以最后一次写入为准。保持首次插入顺序，
//! 使输出的 `Cookie` 头稳定。

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    items: IndexMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// 批量合并
    ///
    /// 先收集全部条目再写入，调用方持有 `&mut self` 期间不会被其他请求观察到中间态。
    pub fn merge<I, K, V>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let incoming: Vec<(String, String)> = items
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.items.extend(incoming);
    }

    /// 当前内容的只读快照，用作出站请求的 Cookie
    pub fn snapshot(&self) -> IndexMap<String, String> {
        self.items.clone()
    }

    /// 清空 (重新登录开始时调用)
    pub fn reset(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.items.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 渲染为 `Cookie` 请求头的值
pub fn header_value(cookies: &IndexMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_per_name() {
        let mut jar = CookieJar::new();
        jar.merge([("session", "1"), ("lang", "pl")]);
        jar.merge([("session", "2")]);
        jar.merge(vec![("other".to_string(), "x".to_string()), ("session".to_string(), "3".to_string())]);

        assert_eq!(jar.get("session"), Some("3"));
        assert_eq!(jar.get("lang"), Some("pl"));
        assert_eq!(jar.get("other"), Some("x"));
        assert_eq!(jar.len(), 3);
    }

    #[test]
    fn empty_merge_is_a_no_op() {
        let mut jar = CookieJar::new();
        jar.merge([("a", "1")]);
        jar.merge(Vec::<(String, String)>::new());
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn reset_empties_the_jar() {
        let mut jar = CookieJar::new();
        jar.merge([("a", "1")]);
        jar.reset();
        assert!(jar.is_empty());
        assert_eq!(jar.get("a"), None);
    }

    #[test]
    fn snapshot_is_detached_from_later_merges() {
        let mut jar = CookieJar::new();
        jar.merge([("a", "1")]);
        let snap = jar.snapshot();
        jar.merge([("a", "2")]);
        assert_eq!(snap.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn header_keeps_first_insertion_order() {
        let mut jar = CookieJar::new();
        jar.merge([("b", "1"), ("a", "2")]);
        jar.merge([("b", "3")]);
        assert_eq!(header_value(&jar.snapshot()), "b=3; a=2");
    }
}
