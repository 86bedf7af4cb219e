use url::Url;

use crate::config::GateConfig;
use crate::cookies::CookieOp;
use crate::logging::GateLog;
use crate::normalize::normalize_params;
use crate::request::RequestDescriptor;
use crate::response::{GateOutcome, PassThrough, Redirect, RedirectReason, SessionState};
use crate::session::{SessionCheck, SessionProvider};

/// What the access check decided for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    /// Let the request through
    Allow,
    /// Send the visitor to the login path
    RedirectToLogin,
    /// Send an authenticated visitor from the login path to the landing path
    RedirectToLanding,
}

/// Result of the access-check stage.
///
/// Carries the session provider's cookie operations alongside the action, so
/// they reach whichever response is finally built.
#[derive(Debug)]
pub struct AuthDecision {
    action: AuthAction,
    session: SessionState,
    cookie_ops: Vec<CookieOp>,
}

impl AuthDecision {
    /// The decided action.
    pub fn action(&self) -> AuthAction {
        self.action
    }

    /// Session state observed by the check.
    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Cookie operations requested by the session provider.
    pub fn cookie_ops(&self) -> &[CookieOp] {
        &self.cookie_ops
    }
}

/// Decides the access action for `path` given session validity.
///
/// - no session, protected, not the login path: [`AuthAction::RedirectToLogin`]
/// - session and the login path: [`AuthAction::RedirectToLanding`]
/// - anything else: [`AuthAction::Allow`]
pub fn classify(config: &GateConfig, path: &str, session_valid: bool) -> AuthAction {
    let is_login = config.is_login_path(path);
    let is_protected = config.is_protected(path);

    if !session_valid && is_protected && !is_login {
        AuthAction::RedirectToLogin
    } else if session_valid && is_login {
        AuthAction::RedirectToLanding
    } else {
        AuthAction::Allow
    }
}

/// The edge request gate.
///
/// Runs once per request, before any handler, as a two-stage pipeline:
///
/// ```text
/// excluded path ──────────────────────────────► PassThrough (Skipped)
/// normalize_params ── marker stripped ────────► Redirect (StaleMarker)
///        │ no redirect
///        ▼
/// check_auth ── provider.validate(cookies) ──► Redirect (login / landing)
///                                          └─► PassThrough
/// ```
///
/// A marker redirect short-circuits: the session provider is not called.
/// Provider failures are treated as "no session" (fail closed).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use edge_gate::{EdgeGate, GateConfig, MemorySessionProvider, RequestDescriptor};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let gate = EdgeGate::new(
///     GateConfig::builder().build().unwrap(),
///     MemorySessionProvider::new("sb-session", Duration::from_secs(3600)),
/// );
///
/// let req = RequestDescriptor::parse("https://shop.example.com/admin/products", None).unwrap();
/// let outcome = gate.handle(&req).await;
///
/// let redirect = outcome.as_redirect().expect("no session");
/// assert_eq!(redirect.target().path(), "/admin/auth");
/// # });
/// ```
#[derive(Debug)]
pub struct EdgeGate<P> {
    config: GateConfig,
    provider: P,
}

impl<P: SessionProvider> EdgeGate<P> {
    /// Creates a gate from a validated configuration and a session provider.
    pub fn new(config: GateConfig, provider: P) -> Self {
        Self { config, provider }
    }

    /// The gate configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The session provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Runs the full pipeline for one request.
    pub async fn handle(&self, req: &RequestDescriptor) -> GateOutcome {
        let log = GateLog::for_request(req);

        if self.config.exclusions().is_excluded(req.path()) {
            log.debug(format_args!("path excluded from gate"));
            return GateOutcome::PassThrough(PassThrough::new(SessionState::Skipped, Vec::new()));
        }

        log.debug(format_args!("param_check"));
        if let Some(redirect) = normalize_params(req, &self.config) {
            return GateOutcome::Redirect(redirect);
        }

        log.debug(format_args!("auth_check"));
        let decision = self.check_auth(req).await;
        self.resolve(req, decision)
    }

    /// Runs the access-check stage on its own.
    ///
    /// Always consults the session provider. An `Err` from the provider
    /// yields [`SessionState::Unavailable`] with no cookie operations, and the
    /// request is classified as unauthenticated.
    pub async fn check_auth(&self, req: &RequestDescriptor) -> AuthDecision {
        let log = GateLog::for_request(req);

        let (session, cookie_ops) = match self.provider.validate(req.cookies()).await {
            Ok(SessionCheck { valid, cookie_ops }) => {
                let state = if valid {
                    SessionState::Valid
                } else {
                    SessionState::Absent
                };
                (state, cookie_ops)
            }
            Err(e) => {
                log.warn(format_args!(
                    "session provider failed, treating as no session: {}",
                    e
                ));
                (SessionState::Unavailable, Vec::new())
            }
        };

        let action = classify(&self.config, req.path(), session.is_valid());
        log.debug(format_args!("session {:?}, action {:?}", session, action));

        AuthDecision {
            action,
            session,
            cookie_ops,
        }
    }

    /// Turns an access decision into the terminal outcome.
    fn resolve(&self, req: &RequestDescriptor, decision: AuthDecision) -> GateOutcome {
        let log = GateLog::for_request(req);

        let (path, reason) = match decision.action {
            AuthAction::Allow => {
                return GateOutcome::PassThrough(PassThrough::new(
                    decision.session,
                    decision.cookie_ops,
                ));
            }
            AuthAction::RedirectToLogin => {
                (self.config.login_path(), RedirectReason::LoginRequired)
            }
            AuthAction::RedirectToLanding => (
                self.config.landing_path(),
                RedirectReason::AlreadyAuthenticated,
            ),
        };

        let target = same_origin_target(req.url(), path);

        // Login redirects never hit this: the request path differs from the
        // login path by construction.
        if target.as_str() == req.url().as_str() {
            log.warn(format_args!(
                "{} redirect target equals request url, passing through",
                reason
            ));
            return GateOutcome::PassThrough(PassThrough::new(
                decision.session,
                decision.cookie_ops,
            ));
        }

        log.info(format_args!("{}, redirecting to {}", reason, target.path()));

        GateOutcome::Redirect(
            Redirect::new(target, self.config.redirect_status(), reason)
                .with_cookies(decision.cookie_ops),
        )
    }
}

/// `base` with its path replaced and its query and fragment cleared.
fn same_origin_target(base: &Url, path: &str) -> Url {
    let mut target = base.clone();
    target.set_path(path);
    target.set_query(None);
    target.set_fragment(None);
    target
}
