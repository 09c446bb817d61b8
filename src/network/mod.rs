pub mod address;
pub mod classifier;
pub mod client;
pub mod cookies;
pub mod document;
pub mod middleware;
pub mod service;
pub mod session;

pub use address::{EndpointAddress, Identity};
pub use classifier::{Outcome, ResponseClassifier};
pub use client::{FetchOptions, LoginSession, PortalClient};
pub use cookies::CookieJar;
pub use document::Document;
pub use service::HttpService;
