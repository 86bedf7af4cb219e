//! Request cookies and the cookie operations a session provider may ask for.
//!
//! The gate treats every cookie opaquely: it parses the `Cookie` header so a
//! [`SessionProvider`](crate::SessionProvider) can look values up, and it
//! renders [`CookieOp`]s back into `Set-Cookie` header values.

use std::collections::BTreeMap;

use cookie::time::Duration;
use cookie::Cookie;

use crate::Secret;

pub use cookie::SameSite;

/// Cookies sent with an incoming request, keyed by name.
///
/// When a name appears more than once the first occurrence wins, matching
/// how browsers order cookies (most specific path first).
#[derive(Debug, Default)]
pub struct RequestCookies {
    entries: BTreeMap<String, Secret<String>>,
}

impl RequestCookies {
    /// Creates an empty cookie set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one `Cookie` header value (`a=1; b=2`).
    ///
    /// Malformed pairs are skipped rather than failing the whole header.
    pub fn parse(header: &str) -> Self {
        let mut cookies = Self::new();
        cookies.extend_from_header(header);
        cookies
    }

    /// Adds the pairs from another `Cookie` header value.
    pub fn extend_from_header(&mut self, header: &str) {
        for parsed in Cookie::split_parse(header) {
            match parsed {
                Ok(c) => self.insert(c.name().to_string(), c.value().to_string()),
                Err(e) => tracing::debug!(error = %e, "skipping malformed cookie pair"),
            }
        }
    }

    /// Inserts a cookie unless one with the same name is already present.
    pub fn insert(&mut self, name: String, value: String) {
        self.entries
            .entry(name)
            .or_insert_with(|| Secret::new(value));
    }

    /// Returns the value of the named cookie.
    pub fn get(&self, name: &str) -> Option<&Secret<String>> {
        self.entries.get(name)
    }

    /// Returns true if the named cookie is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over cookie names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of distinct cookies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the request carried no cookies.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Attributes applied to a cookie written on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    /// `Path` attribute
    pub path: Option<String>,
    /// `Domain` attribute
    pub domain: Option<String>,
    /// `Max-Age` in seconds
    pub max_age_secs: Option<i64>,
    /// `HttpOnly` flag
    pub http_only: bool,
    /// `Secure` flag
    pub secure: bool,
    /// `SameSite` attribute
    pub same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: Some("/".to_string()),
            domain: None,
            max_age_secs: None,
            http_only: true,
            secure: true,
            same_site: Some(SameSite::Lax),
        }
    }
}

/// A cookie mutation requested by a session provider.
///
/// The gate attaches these to whatever response it decides on, so a token
/// refreshed during validation survives a redirect as well as a pass-through.
#[derive(Debug)]
pub enum CookieOp {
    /// Write (or overwrite) a cookie
    Set {
        /// Cookie name
        name: String,
        /// New value
        value: Secret<String>,
        /// Attributes
        options: CookieOptions,
    },
    /// Clear a cookie: empty value, immediate expiry
    Remove {
        /// Cookie name
        name: String,
        /// Attributes; path and domain must match the original cookie
        options: CookieOptions,
    },
}

impl CookieOp {
    /// Builds a `Set` operation.
    pub fn set(name: impl Into<String>, value: impl Into<String>, options: CookieOptions) -> Self {
        CookieOp::Set {
            name: name.into(),
            value: Secret::new(value.into()),
            options,
        }
    }

    /// Builds a `Remove` operation.
    pub fn remove(name: impl Into<String>, options: CookieOptions) -> Self {
        CookieOp::Remove {
            name: name.into(),
            options,
        }
    }

    /// The cookie name this operation touches.
    pub fn name(&self) -> &str {
        match self {
            CookieOp::Set { name, .. } | CookieOp::Remove { name, .. } => name,
        }
    }

    /// Returns true for a `Remove` operation.
    pub fn is_removal(&self) -> bool {
        matches!(self, CookieOp::Remove { .. })
    }

    /// Renders the operation as a `Set-Cookie` header value.
    ///
    /// This is the only place cookie values leave their [`Secret`] wrapper.
    pub fn to_set_cookie(&self) -> String {
        match self {
            CookieOp::Set {
                name,
                value,
                options,
            } => build_cookie(name, value.expose_secret(), options).to_string(),
            CookieOp::Remove { name, options } => {
                let mut c = build_cookie(name, "", options);
                c.make_removal();
                c.to_string()
            }
        }
    }
}

fn build_cookie(name: &str, value: &str, options: &CookieOptions) -> Cookie<'static> {
    let mut builder = Cookie::build((name.to_string(), value.to_string()))
        .http_only(options.http_only)
        .secure(options.secure);

    if let Some(path) = &options.path {
        builder = builder.path(path.clone());
    }
    if let Some(domain) = &options.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(secs) = options.max_age_secs {
        builder = builder.max_age(Duration::seconds(secs));
    }
    if let Some(same_site) = options.same_site {
        builder = builder.same_site(same_site);
    }

    builder.build()
}
