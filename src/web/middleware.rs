//! Applying gate outcomes to `http` types.
//!
//! A host framework runs the gate before its router:
//!
//! ```text
//! http::Request ── EdgeGate::handle_http ──► GateOutcome
//!   Redirect     → redirect_response(&redirect)            (handler not run)
//!   PassThrough  → run handler, then append_cookie_ops(response.headers_mut(), ...)
//! ```

use http::header::{HeaderMap, HeaderValue, LOCATION, SET_COOKIE};
use http::{Response, StatusCode};

use crate::cookies::CookieOp;
use crate::gate::EdgeGate;
use crate::response::{GateOutcome, Redirect};
use crate::session::SessionProvider;

use super::DescribeRequest;

impl<P: SessionProvider> EdgeGate<P> {
    /// Runs the gate on an `http::Request`, resolving its path against the
    /// configured site origin.
    pub async fn handle_http<B>(&self, req: &http::Request<B>) -> GateOutcome {
        let descriptor = req.describe(self.config().site_origin());
        self.handle(&descriptor).await
    }
}

/// Builds the redirect response: status, `Location`, and one `Set-Cookie`
/// header per cookie operation.
///
/// # Errors
///
/// Returns `http::Error` if the response cannot be assembled.
///
/// # Examples
///
/// ```
/// use edge_gate::{Redirect, RedirectReason, RedirectStatus};
/// use edge_gate::web::redirect_response;
/// use url::Url;
///
/// let redirect = Redirect::new(
///     Url::parse("https://shop.example.com/admin/auth").unwrap(),
///     RedirectStatus::TemporaryRedirect,
///     RedirectReason::LoginRequired,
/// );
/// let response: http::Response<()> = redirect_response(&redirect).unwrap();
///
/// assert_eq!(response.status(), 307);
/// assert_eq!(response.headers()["location"], "https://shop.example.com/admin/auth");
/// ```
pub fn redirect_response<B: Default>(redirect: &Redirect) -> Result<Response<B>, http::Error> {
    let status = StatusCode::from_u16(redirect.status().code())?;
    let mut response = Response::builder()
        .status(status)
        .header(LOCATION, redirect.target().as_str())
        .body(B::default())?;

    append_cookie_ops(response.headers_mut(), redirect.cookies());
    Ok(response)
}

/// Appends one `Set-Cookie` header per operation.
///
/// Operations that do not render to a valid header value are dropped with a
/// warning; the cookie name is logged, never the value.
pub fn append_cookie_ops(headers: &mut HeaderMap, ops: &[CookieOp]) {
    for op in ops {
        match HeaderValue::from_str(&op.to_set_cookie()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(_) => tracing::warn!(cookie = %op.name(), "dropping unrenderable cookie"),
        }
    }
}

/// Applies an outcome's cookie operations to a handler response.
///
/// For a pass-through this is the only step needed after the handler runs.
pub fn apply_outcome_cookies<B>(outcome: &GateOutcome, response: &mut Response<B>) {
    append_cookie_ops(response.headers_mut(), outcome.cookies());
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::cookies::CookieOptions;
    use crate::response::{PassThrough, RedirectReason, RedirectStatus, SessionState};

    fn redirect() -> Redirect {
        Redirect::new(
            Url::parse("https://example.com/admin").unwrap(),
            RedirectStatus::Found,
            RedirectReason::AlreadyAuthenticated,
        )
    }

    #[test]
    fn redirect_response_sets_status_and_location() {
        let response: Response<()> = redirect_response(&redirect()).unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "https://example.com/admin");
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn redirect_response_carries_cookies() {
        let r = redirect().with_cookies(vec![
            CookieOp::set("sid", "new", CookieOptions::default()),
            CookieOp::remove("legacy", CookieOptions::default()),
        ]);
        let response: Response<String> = redirect_response(&r).unwrap();

        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].to_str().unwrap().starts_with("sid=new"));
        assert!(cookies[1].to_str().unwrap().starts_with("legacy=;"));
    }

    #[test]
    fn unrenderable_cookie_is_dropped() {
        let mut headers = HeaderMap::new();
        append_cookie_ops(
            &mut headers,
            &[
                CookieOp::set("bad", "line\nbreak", CookieOptions::default()),
                CookieOp::set("good", "v", CookieOptions::default()),
            ],
        );

        let values: Vec<_> = headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(values.len(), 1);
        assert!(values[0].to_str().unwrap().starts_with("good=v"));
    }

    #[test]
    fn pass_through_cookies_reach_handler_response() {
        let outcome = GateOutcome::PassThrough(PassThrough::new(
            SessionState::Valid,
            vec![CookieOp::set("sid", "refreshed", CookieOptions::default())],
        ));
        let mut response = Response::new(());

        apply_outcome_cookies(&outcome, &mut response);

        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 1);
    }
}
