//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use edge_gate::{
    CookieOp, CookieOptions, EdgeGate, GateConfig, RequestCookies, RequestDescriptor,
    SessionCheck, SessionError, SessionProvider,
};

pub const ORIGIN: &str = "https://shop.example.com";

/// Provider with a fixed answer that counts how often it is asked.
#[derive(Debug, Default)]
pub struct StaticSession {
    valid: bool,
    refresh_cookie: Option<&'static str>,
    calls: AtomicUsize,
}

impl StaticSession {
    pub fn signed_in() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Valid session whose check also re-sets `cookie`.
    pub fn refreshing(cookie: &'static str) -> Self {
        Self {
            valid: true,
            refresh_cookie: Some(cookie),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SessionProvider for StaticSession {
    async fn validate(&self, _: &RequestCookies) -> Result<SessionCheck, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let check = if self.valid {
            SessionCheck::valid()
        } else {
            SessionCheck::absent()
        };
        Ok(match self.refresh_cookie {
            Some(name) => check.with_cookie_ops(vec![CookieOp::set(
                name,
                "refreshed-token",
                CookieOptions::default(),
            )]),
            None => check,
        })
    }
}

/// Provider whose backend is always down.
#[derive(Debug, Default)]
pub struct DownSession;

impl SessionProvider for DownSession {
    async fn validate(&self, _: &RequestCookies) -> Result<SessionCheck, SessionError> {
        Err(SessionError::unavailable("auth backend timed out"))
    }
}

pub fn gate<P: SessionProvider>(provider: P) -> EdgeGate<P> {
    let config = GateConfig::builder()
        .site_origin(ORIGIN)
        .build()
        .expect("default config is valid");
    EdgeGate::new(config, provider)
}

/// Descriptor for `path_and_query` on the test origin.
pub fn request(path_and_query: &str) -> RequestDescriptor {
    RequestDescriptor::parse(&format!("{}{}", ORIGIN, path_and_query), None)
        .expect("test url parses")
}

pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime builds")
        .block_on(future)
}
