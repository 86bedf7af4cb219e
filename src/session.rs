//! Session provider seam.
//!
//! The gate never inspects session tokens itself. It hands the request
//! cookies to a [`SessionProvider`] and gets back a [`SessionCheck`]: whether
//! a valid session exists, plus any cookie operations the provider wants
//! applied (a refreshed token, a cleared stale cookie).
//!
//! Providers are injected into [`EdgeGate`](crate::EdgeGate); nothing here
//! is global.

mod memory;

use std::future::Future;

use crate::cookies::{CookieOp, RequestCookies};
use crate::error::SessionError;

pub use memory::MemorySessionProvider;

/// Result of validating a request's session cookies.
#[derive(Debug, Default)]
pub struct SessionCheck {
    /// Whether a valid session exists
    pub valid: bool,
    /// Cookie mutations to apply to the outgoing response
    pub cookie_ops: Vec<CookieOp>,
}

impl SessionCheck {
    /// A valid session with no cookie changes.
    pub fn valid() -> Self {
        Self {
            valid: true,
            cookie_ops: Vec::new(),
        }
    }

    /// No session and no cookie changes.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Attaches cookie operations.
    pub fn with_cookie_ops(mut self, ops: Vec<CookieOp>) -> Self {
        self.cookie_ops = ops;
        self
    }
}

/// Validates sessions from request cookies.
///
/// Implementations may perform network I/O and may refresh tokens; any
/// refreshed cookie must be returned in [`SessionCheck::cookie_ops`]. An
/// `Err` means the provider could not decide, and the gate fails closed.
///
/// Implementors can use `async fn`:
///
/// ```
/// use edge_gate::{RequestCookies, SessionCheck, SessionError, SessionProvider};
///
/// struct HeaderFlag;
///
/// impl SessionProvider for HeaderFlag {
///     async fn validate(&self, cookies: &RequestCookies) -> Result<SessionCheck, SessionError> {
///         Ok(if cookies.contains("logged_in") {
///             SessionCheck::valid()
///         } else {
///             SessionCheck::absent()
///         })
///     }
/// }
/// ```
pub trait SessionProvider: Send + Sync {
    /// Checks the cookies for a valid session.
    fn validate(
        &self,
        cookies: &RequestCookies,
    ) -> impl Future<Output = Result<SessionCheck, SessionError>> + Send;
}

impl<P: SessionProvider> SessionProvider for std::sync::Arc<P> {
    fn validate(
        &self,
        cookies: &RequestCookies,
    ) -> impl Future<Output = Result<SessionCheck, SessionError>> + Send {
        (**self).validate(cookies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::CookieOptions;

    #[test]
    fn constructors_set_validity() {
        assert!(SessionCheck::valid().valid);
        assert!(!SessionCheck::absent().valid);
        assert!(SessionCheck::absent().cookie_ops.is_empty());
    }

    #[test]
    fn with_cookie_ops_attaches_ops() {
        let check = SessionCheck::valid()
            .with_cookie_ops(vec![CookieOp::set("sid", "t", CookieOptions::default())]);
        assert_eq!(check.cookie_ops.len(), 1);
    }
}
