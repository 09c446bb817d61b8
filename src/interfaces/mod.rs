pub mod auth;
pub mod transport;

pub use auth::{Authenticator, CookieAuthenticator, Credentials};
pub use transport::{PortalRequest, PortalResponse, Transport};
