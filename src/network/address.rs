//! 端点地址 (Endpoint Address)
//!
//! 解析复合身份字符串 `protocol://host/symbol\alias\login`，并将协议、主机、
//! 路由符号代入 URL 模板。解析是宽松的: 任何输入都不会被拒绝，
//! 但形状不符的输入会以 `Identity::Malformed` 显式返回。

use std::fmt;

const SEGMENT_SEPARATOR: char = '\\';
const SCHEME_SEPARATOR: &str = "://";

/// 主机名中的冒号需经两次 URL 编码才能原样到达门户
const ENCODED_COLON: &str = "%253A";

/// 身份字符串解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// 仅登录名，端点沿用默认值
    Bare { login: String },
    /// 完整的 `protocol://host[/symbol]\alias\login`
    Composite {
        protocol: String,
        host: String,
        symbol: Option<String>,
        alias: String,
        login: String,
    },
    /// 分段数足够，但首段不是 `protocol://host` 形状
    Malformed { raw: String, login: String },
}

impl Identity {
    pub fn parse(input: &str) -> Self {
        let segments: Vec<&str> = input.split(SEGMENT_SEPARATOR).collect();
        if segments.len() < 3 {
            return Identity::Bare {
                login: input.to_string(),
            };
        }

        let login = segments[2].to_string();
        let Some((protocol, path)) = segments[0].split_once(SCHEME_SEPARATOR) else {
            return Identity::Malformed {
                raw: input.to_string(),
                login,
            };
        };

        let mut path = path.split('/');
        let host = path.next().unwrap_or_default();
        if protocol.is_empty() || host.is_empty() {
            return Identity::Malformed {
                raw: input.to_string(),
                login,
            };
        }

        Identity::Composite {
            protocol: protocol.to_string(),
            host: host.to_string(),
            symbol: path.next().map(str::to_string),
            alias: segments[1].to_string(),
            login,
        }
    }

    /// 实际用于登录的标识 (邮箱/用户名)
    pub fn login(&self) -> &str {
        match self {
            Identity::Bare { login }
            | Identity::Composite { login, .. }
            | Identity::Malformed { login, .. } => login,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Identity::Malformed { .. })
    }
}

/// 门户端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointAddress {
    protocol: String,
    host: String,
    symbol: String,
}

impl EndpointAddress {
    pub fn new(protocol: impl Into<String>, host: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            symbol: symbol.into(),
        }
    }

    /// 以 `defaults` 为基础叠加身份字符串中的端点信息
    ///
    /// 复合身份中缺省的符号保留默认值 (通常是配置中的初始猜测)。
    pub fn from_identity(identity: &Identity, defaults: EndpointAddress) -> Self {
        match identity {
            Identity::Composite {
                protocol,
                host,
                symbol,
                ..
            } => Self {
                protocol: protocol.clone(),
                host: host.clone(),
                symbol: symbol.clone().unwrap_or(defaults.symbol),
            },
            Identity::Bare { .. } | Identity::Malformed { .. } => defaults,
        }
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn set_symbol(&mut self, symbol: impl Into<String>) {
        self.symbol = symbol.into();
    }

    /// 替换模板中的 `{schema}` / `{host}` / `{symbol}` 占位符
    pub fn fill(&self, template: &str) -> String {
        template
            .replace("{schema}", &self.protocol)
            .replace("{host}", &self.host.replace(':', ENCODED_COLON))
            .replace("{symbol}", &self.symbol)
    }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.protocol, self.host, self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> EndpointAddress {
        EndpointAddress::new("https", "vulcan.net.pl", "")
    }

    #[test]
    fn composite_identity_is_split_into_parts() {
        let identity = Identity::parse(r"https://vulcan.net.pl/123\loginA\realuser@example.com");
        assert_eq!(
            identity,
            Identity::Composite {
                protocol: "https".into(),
                host: "vulcan.net.pl".into(),
                symbol: Some("123".into()),
                alias: "loginA".into(),
                login: "realuser@example.com".into(),
            }
        );

        let address = EndpointAddress::from_identity(&identity, defaults());
        assert_eq!(address.protocol(), "https");
        assert_eq!(address.host(), "vulcan.net.pl");
        assert_eq!(address.symbol(), "123");
        assert_eq!(identity.login(), "realuser@example.com");
    }

    #[test]
    fn bare_identity_keeps_defaults() {
        let identity = Identity::parse("user@example.com");
        assert_eq!(identity.login(), "user@example.com");

        let address = EndpointAddress::from_identity(&identity, EndpointAddress::new("http", "fakelog.cf", "Default"));
        assert_eq!(address, EndpointAddress::new("http", "fakelog.cf", "Default"));
    }

    #[test]
    fn composite_without_symbol_keeps_guess() {
        let identity = Identity::parse(r"http://fakelog.cf\alias\jan@fakelog.cf");
        let address = EndpointAddress::from_identity(&identity, EndpointAddress::new("https", "x", "guess"));
        assert_eq!(address, EndpointAddress::new("http", "fakelog.cf", "guess"));
    }

    #[test]
    fn two_segments_are_still_bare() {
        let identity = Identity::parse(r"https://a/1\user");
        assert_eq!(identity.login(), r"https://a/1\user");
        assert!(!identity.is_malformed());
    }

    #[test]
    fn missing_scheme_is_reported_as_malformed() {
        let identity = Identity::parse(r"vulcan.net.pl/123\alias\user@example.com");
        assert!(identity.is_malformed());
        assert_eq!(identity.login(), "user@example.com");

        let address = EndpointAddress::from_identity(&identity, defaults());
        assert_eq!(address, defaults());
    }

    #[test]
    fn empty_host_is_reported_as_malformed() {
        assert!(Identity::parse(r"https:///123\alias\user").is_malformed());
    }

    #[test]
    fn fill_substitutes_and_encodes_host_colon() {
        let address = EndpointAddress::new("https", "a:80", "42");
        assert_eq!(address.fill("{schema}://{host}/{symbol}/x"), "https://a%253A80/42/x");
    }

    #[test]
    fn fill_with_empty_symbol_leaves_gap() {
        let address = EndpointAddress::new("https", "vulcan.net.pl", "");
        assert_eq!(address.fill("{schema}://uonetplus.{host}/{symbol}/Start.mvc"), "https://uonetplus.vulcan.net.pl//Start.mvc");
        assert_eq!(address.fill("https://static/page"), "https://static/page");
    }
}
