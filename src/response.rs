//! Decisions produced by the gate.
//!
//! A request ends in exactly one of two terminal states: a [`Redirect`] or a
//! [`PassThrough`]. Both carry the cookie operations produced by the session
//! provider during the same invocation.

use std::fmt;

use url::Url;

use crate::cookies::CookieOp;

/// HTTP status used for gate redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectStatus {
    /// 301; cached by clients indefinitely
    MovedPermanently,
    /// 302
    Found,
    /// 303
    SeeOther,
    /// 307; the default
    #[default]
    TemporaryRedirect,
    /// 308; cached by clients indefinitely
    PermanentRedirect,
}

impl RedirectStatus {
    /// The numeric status code.
    pub fn code(self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
            RedirectStatus::SeeOther => 303,
            RedirectStatus::TemporaryRedirect => 307,
            RedirectStatus::PermanentRedirect => 308,
        }
    }

    /// Maps a numeric code back to a status, if it is a supported redirect.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            301 => Some(RedirectStatus::MovedPermanently),
            302 => Some(RedirectStatus::Found),
            303 => Some(RedirectStatus::SeeOther),
            307 => Some(RedirectStatus::TemporaryRedirect),
            308 => Some(RedirectStatus::PermanentRedirect),
            _ => None,
        }
    }

    /// True for statuses clients may cache permanently.
    pub fn is_permanent(self) -> bool {
        matches!(
            self,
            RedirectStatus::MovedPermanently | RedirectStatus::PermanentRedirect
        )
    }
}

impl fmt::Display for RedirectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Why the gate redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// The tracking marker was stripped from the query
    StaleMarker,
    /// A protected path was requested without a session
    LoginRequired,
    /// The login path was requested with a valid session
    AlreadyAuthenticated,
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectReason::StaleMarker => write!(f, "stale_marker"),
            RedirectReason::LoginRequired => write!(f, "login_required"),
            RedirectReason::AlreadyAuthenticated => write!(f, "already_authenticated"),
        }
    }
}

/// What the gate learned about the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The provider was not consulted
    Skipped,
    /// A valid session exists
    Valid,
    /// No valid session
    Absent,
    /// The provider failed; treated as absent
    Unavailable,
}

impl SessionState {
    /// True only for [`SessionState::Valid`].
    pub fn is_valid(self) -> bool {
        self == SessionState::Valid
    }
}

/// A redirect decision.
#[derive(Debug)]
pub struct Redirect {
    target: Url,
    status: RedirectStatus,
    reason: RedirectReason,
    cookies: Vec<CookieOp>,
}

impl Redirect {
    /// Creates a redirect with no cookie operations.
    pub fn new(target: Url, status: RedirectStatus, reason: RedirectReason) -> Self {
        Self {
            target,
            status,
            reason,
            cookies: Vec::new(),
        }
    }

    /// Attaches cookie operations to send with the redirect.
    pub fn with_cookies(mut self, cookies: Vec<CookieOp>) -> Self {
        self.cookies = cookies;
        self
    }

    /// The absolute target URL, used as the `Location` header.
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// The redirect status.
    pub fn status(&self) -> RedirectStatus {
        self.status
    }

    /// Why the redirect was issued.
    pub fn reason(&self) -> RedirectReason {
        self.reason
    }

    /// Cookie operations to apply to the redirect response.
    pub fn cookies(&self) -> &[CookieOp] {
        &self.cookies
    }
}

/// A pass-through decision: let the request reach its handler.
#[derive(Debug)]
pub struct PassThrough {
    session: SessionState,
    cookies: Vec<CookieOp>,
}

impl PassThrough {
    /// Creates a pass-through decision.
    pub fn new(session: SessionState, cookies: Vec<CookieOp>) -> Self {
        Self { session, cookies }
    }

    /// Session state observed while deciding.
    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Cookie operations to apply to the downstream response.
    pub fn cookies(&self) -> &[CookieOp] {
        &self.cookies
    }
}

/// The terminal decision for one request.
#[derive(Debug)]
pub enum GateOutcome {
    /// Send a redirect instead of running the handler
    Redirect(Redirect),
    /// Run the handler
    PassThrough(PassThrough),
}

impl GateOutcome {
    /// Returns the redirect, if this outcome is one.
    pub fn as_redirect(&self) -> Option<&Redirect> {
        match self {
            GateOutcome::Redirect(r) => Some(r),
            GateOutcome::PassThrough(_) => None,
        }
    }

    /// Returns true for a pass-through outcome.
    pub fn is_pass_through(&self) -> bool {
        matches!(self, GateOutcome::PassThrough(_))
    }

    /// Cookie operations to apply whatever the outcome.
    pub fn cookies(&self) -> &[CookieOp] {
        match self {
            GateOutcome::Redirect(r) => r.cookies(),
            GateOutcome::PassThrough(p) => p.cookies(),
        }
    }
}
