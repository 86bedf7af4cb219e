//! Edge request gate for a storefront with a session-protected admin area.
//!
//! Every request (outside an exclusion list) passes through two stages
//! before reaching a page handler:
//! - **Marker normalization**: a stale tracking parameter (`m=1`) is stripped
//!   with a redirect, and a redirect is only issued when the target differs
//!   from the request URL, so the gate cannot loop
//! - **Access gating**: paths under the protected prefix (`/admin`) require a
//!   session, and the login path bounces visitors who already have one
//!
//! Sessions are validated by an injected [`SessionProvider`]. Cookie
//! mutations it requests (refreshed or cleared tokens) travel with the
//! decision and are sent on redirects and pass-throughs alike. A failing
//! provider is treated as "no session".
//!
//! # Core Types
//!
//! - [`EdgeGate`]: the two-stage pipeline
//! - [`GateConfig`]: validated paths, marker and redirect status
//! - [`RequestDescriptor`]: URL, cookies and request id of one request
//! - [`GateOutcome`]: [`Redirect`] or [`PassThrough`], each with cookie ops
//! - [`SessionProvider`]: the session seam; [`MemorySessionProvider`] is an
//!   in-process implementation
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use edge_gate::{EdgeGate, GateConfig, MemorySessionProvider, RequestDescriptor};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let provider = MemorySessionProvider::new("sb-session", Duration::from_secs(3600));
//! provider.insert("tok-1").unwrap();
//! let gate = EdgeGate::new(GateConfig::builder().build().unwrap(), provider);
//!
//! // The marker is stripped first, without consulting the session provider
//! let req = RequestDescriptor::parse("https://shop.example.com/blog/my-post?m=1", None).unwrap();
//! let outcome = gate.handle(&req).await;
//! assert_eq!(
//!     outcome.as_redirect().unwrap().target().as_str(),
//!     "https://shop.example.com/blog/my-post"
//! );
//!
//! // A signed-in visitor of the login page is sent to the dashboard
//! let req = RequestDescriptor::parse(
//!     "https://shop.example.com/admin/auth",
//!     Some("sb-session=tok-1"),
//! )
//! .unwrap();
//! let outcome = gate.handle(&req).await;
//! assert_eq!(outcome.as_redirect().unwrap().target().path(), "/admin");
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::print_stdout, clippy::print_stderr, clippy::dbg_macro)]

mod config;
mod cookies;
mod error;
mod gate;
mod logging;
mod normalize;
mod request;
mod response;
mod secret;
mod session;
pub mod web;

pub use config::{
    ExclusionMatcher, GateConfig, GateConfigBuilder, ENV_LANDING_PATH, ENV_LOGIN_PATH,
    ENV_ORIGIN, ENV_PROTECTED_PREFIX, ENV_REDIRECT_STATUS,
};
pub use cookies::{CookieOp, CookieOptions, RequestCookies, SameSite};
pub use error::{
    ConfigError, ConfigErrorKind, RequestError, RequestErrorKind, SessionError, SessionErrorKind,
};
pub use gate::{classify, AuthAction, AuthDecision, EdgeGate};
pub use normalize::{normalize_params, strip_query_key};
pub use request::RequestDescriptor;
pub use response::{
    GateOutcome, PassThrough, Redirect, RedirectReason, RedirectStatus, SessionState,
};
pub use secret::Secret;
pub use session::{MemorySessionProvider, SessionCheck, SessionProvider};
