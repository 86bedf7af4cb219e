use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::cookies::{CookieOp, CookieOptions, RequestCookies};
use crate::error::{SessionError, SessionErrorKind};

use super::{SessionCheck, SessionProvider};

/// Expiry of a registered token; `None` never expires.
type Expiry = Option<Instant>;

/// In-process session store keyed by an opaque token cookie.
///
/// Tokens are registered with [`insert`](Self::insert). Validation:
/// - no cookie: absent, no cookie changes
/// - unknown or expired token: absent, and the stale cookie is removed
/// - token inside the refresh window: valid, expiry extended and the cookie
///   re-set with a fresh `Max-Age`
/// - otherwise: valid, no cookie changes
///
/// A TTL too large to add to the current instant (`Duration::MAX`, say)
/// registers tokens that never expire. Expired tokens are swept on every
/// insert and by [`purge_expired`](Self::purge_expired).
///
/// A poisoned lock is reported as [`SessionError`] so the gate fails closed.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use edge_gate::{MemorySessionProvider, RequestCookies, SessionProvider};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let provider = MemorySessionProvider::new("sb-session", Duration::from_secs(3600));
/// provider.insert("tok-1").unwrap();
///
/// let check = provider
///     .validate(&RequestCookies::parse("sb-session=tok-1"))
///     .await
///     .unwrap();
/// assert!(check.valid);
/// # });
/// ```
pub struct MemorySessionProvider {
    cookie_name: String,
    ttl: Duration,
    refresh_window: Duration,
    cookie_options: CookieOptions,
    sessions: RwLock<HashMap<String, Expiry>>,
}

impl MemorySessionProvider {
    /// Creates a provider reading `cookie_name`, with sessions lasting `ttl`.
    ///
    /// The refresh window defaults to a quarter of the TTL.
    pub fn new(cookie_name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            ttl,
            refresh_window: ttl / 4,
            cookie_options: CookieOptions::default(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Sets how close to expiry a session must be before it is refreshed.
    pub fn with_refresh_window(mut self, window: Duration) -> Self {
        self.refresh_window = window;
        self
    }

    /// Sets the attributes used when writing or clearing the cookie.
    pub fn with_cookie_options(mut self, options: CookieOptions) -> Self {
        self.cookie_options = options;
        self
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Registers a token valid for the full TTL.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session table lock is poisoned.
    pub fn insert(&self, token: impl Into<String>) -> Result<(), SessionError> {
        self.register(token.into(), Instant::now().checked_add(self.ttl))
    }

    /// Registers a token expiring at `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session table lock is poisoned.
    pub fn insert_until(
        &self,
        token: impl Into<String>,
        expires_at: Instant,
    ) -> Result<(), SessionError> {
        self.register(token.into(), Some(expires_at))
    }

    /// Removes a token, ending its session. Returns false if it was unknown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session table lock is poisoned.
    pub fn revoke(&self, token: &str) -> Result<bool, SessionError> {
        Ok(self.write()?.remove(token).is_some())
    }

    /// Drops every expired token and returns how many were dropped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session table lock is poisoned.
    pub fn purge_expired(&self) -> Result<usize, SessionError> {
        let mut sessions = self.write()?;
        Ok(sweep(&mut sessions, Instant::now()))
    }

    /// Number of registered tokens, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no tokens are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn register(&self, token: String, expiry: Expiry) -> Result<(), SessionError> {
        let mut sessions = self.write()?;
        let swept = sweep(&mut sessions, Instant::now());
        if swept > 0 {
            tracing::debug!(cookie = %self.cookie_name, swept, "expired sessions swept");
        }
        sessions.insert(token, expiry);
        Ok(())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Expiry>>, SessionError> {
        self.sessions.write().map_err(|_| {
            tracing::error!(cookie = %self.cookie_name, "session table lock poisoned");
            SessionError::new(SessionErrorKind::Backend, "session table lock poisoned")
        })
    }

    fn check(&self, cookies: &RequestCookies) -> Result<SessionCheck, SessionError> {
        let Some(token) = cookies.get(&self.cookie_name) else {
            return Ok(SessionCheck::absent());
        };
        let token = token.expose_secret();
        let now = Instant::now();

        let mut sessions = self.write()?;

        let expires_at = match sessions.get(token).copied() {
            Some(None) => return Ok(SessionCheck::valid()),
            Some(Some(expires_at)) if expires_at > now => expires_at,
            Some(Some(_)) => {
                sessions.remove(token);
                tracing::debug!(cookie = %self.cookie_name, "expired session token");
                return Ok(SessionCheck::absent().with_cookie_ops(vec![self.removal()]));
            }
            None => {
                tracing::debug!(cookie = %self.cookie_name, "unknown session token");
                return Ok(SessionCheck::absent().with_cookie_ops(vec![self.removal()]));
            }
        };

        if expires_at.duration_since(now) > self.refresh_window {
            return Ok(SessionCheck::valid());
        }

        sessions.insert(token.clone(), now.checked_add(self.ttl));
        tracing::debug!(cookie = %self.cookie_name, "session refreshed");

        let options = CookieOptions {
            max_age_secs: Some(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)),
            ..self.cookie_options.clone()
        };
        Ok(SessionCheck::valid().with_cookie_ops(vec![CookieOp::set(
            self.cookie_name.clone(),
            token.clone(),
            options,
        )]))
    }

    fn removal(&self) -> CookieOp {
        CookieOp::remove(self.cookie_name.clone(), self.cookie_options.clone())
    }
}

/// Removes entries that expired at or before `now`.
fn sweep(sessions: &mut HashMap<String, Expiry>, now: Instant) -> usize {
    let before = sessions.len();
    sessions.retain(|_, expiry| expiry.map_or(true, |at| at > now));
    before - sessions.len()
}

// Tokens are bearer material; Debug shows only the table size.
impl fmt::Debug for MemorySessionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySessionProvider")
            .field("cookie_name", &self.cookie_name)
            .field("ttl", &self.ttl)
            .field("refresh_window", &self.refresh_window)
            .field("sessions", &self.len())
            .finish()
    }
}

impl SessionProvider for MemorySessionProvider {
    async fn validate(&self, cookies: &RequestCookies) -> Result<SessionCheck, SessionError> {
        self.check(cookies)
    }
}
