//! Gate configuration.
//!
//! [`GateConfig`] is immutable once built. Use [`GateConfig::builder`] to
//! override defaults; `build()` validates every path before a gate can be
//! constructed from it.

use url::Url;

use crate::error::{ConfigError, ConfigErrorKind};
use crate::response::RedirectStatus;

/// Environment variable overriding the site origin.
pub const ENV_ORIGIN: &str = "EDGE_GATE_ORIGIN";
/// Environment variable overriding the protected prefix.
pub const ENV_PROTECTED_PREFIX: &str = "EDGE_GATE_PROTECTED_PREFIX";
/// Environment variable overriding the login path.
pub const ENV_LOGIN_PATH: &str = "EDGE_GATE_LOGIN_PATH";
/// Environment variable overriding the landing path.
pub const ENV_LANDING_PATH: &str = "EDGE_GATE_LANDING_PATH";
/// Environment variable overriding the redirect status code.
pub const ENV_REDIRECT_STATUS: &str = "EDGE_GATE_REDIRECT_STATUS";

const DEFAULT_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_EXCLUSIONS: [&str; 4] = ["/api", "/_next/static", "/_next/image", "/favicon.ico"];

/// Paths the gate does not run on at all.
///
/// Matching is a literal prefix test on the request path, so `/api` also
/// covers `/api/revalidate` and `/apiary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionMatcher {
    prefixes: Vec<String>,
}

impl ExclusionMatcher {
    /// Creates a matcher from path prefixes.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// A matcher that excludes nothing.
    pub fn none() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    /// Returns true if the gate should skip this path.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// The configured prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for ExclusionMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSIONS)
    }
}

/// Validated gate configuration.
///
/// # Examples
///
/// ```
/// use edge_gate::GateConfig;
///
/// let config = GateConfig::builder()
///     .protected_prefix("/dashboard")
///     .login_path("/dashboard/login")
///     .landing_path("/dashboard")
///     .build()
///     .expect("valid paths");
///
/// assert!(config.is_protected("/dashboard/orders"));
/// assert!(config.is_login_path("/dashboard/login"));
/// ```
#[derive(Debug, Clone)]
pub struct GateConfig {
    site_origin: Url,
    protected_prefix: String,
    login_path: String,
    landing_path: String,
    marker_key: String,
    marker_value: String,
    exclusions: ExclusionMatcher,
    redirect_status: RedirectStatus,
}

impl GateConfig {
    /// Starts a builder populated with the defaults.
    pub fn builder() -> GateConfigBuilder {
        GateConfigBuilder::new()
    }

    /// Origin used to absolutize request URIs that arrive without one.
    pub fn site_origin(&self) -> &Url {
        &self.site_origin
    }

    /// Prefix under which a session is required.
    pub fn protected_prefix(&self) -> &str {
        &self.protected_prefix
    }

    /// The login route, exempt from protection.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Where authenticated users visiting the login route are sent.
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    /// The tracking query key stripped by normalization.
    pub fn marker_key(&self) -> &str {
        &self.marker_key
    }

    /// The value of the marker key that triggers normalization.
    pub fn marker_value(&self) -> &str {
        &self.marker_value
    }

    /// Paths the gate skips.
    pub fn exclusions(&self) -> &ExclusionMatcher {
        &self.exclusions
    }

    /// Status used for every redirect the gate issues.
    pub fn redirect_status(&self) -> RedirectStatus {
        self.redirect_status
    }

    /// True if `path` is exactly the login route.
    pub fn is_login_path(&self, path: &str) -> bool {
        path == self.login_path
    }

    /// True if `path` starts with the protected prefix.
    pub fn is_protected(&self, path: &str) -> bool {
        path.starts_with(self.protected_prefix.as_str())
    }
}

/// Builder for [`GateConfig`].
#[derive(Debug, Clone)]
pub struct GateConfigBuilder {
    site_origin: String,
    protected_prefix: String,
    login_path: String,
    landing_path: String,
    marker_key: String,
    marker_value: String,
    exclusions: ExclusionMatcher,
    redirect_status: u16,
}

impl GateConfigBuilder {
    /// Creates a builder holding the default configuration.
    pub fn new() -> Self {
        Self {
            site_origin: DEFAULT_ORIGIN.to_string(),
            protected_prefix: "/admin".to_string(),
            login_path: "/admin/auth".to_string(),
            landing_path: "/admin".to_string(),
            marker_key: "m".to_string(),
            marker_value: "1".to_string(),
            exclusions: ExclusionMatcher::default(),
            redirect_status: RedirectStatus::default().code(),
        }
    }

    /// Sets the site origin (scheme, host and port).
    pub fn site_origin(mut self, origin: impl Into<String>) -> Self {
        self.site_origin = origin.into();
        self
    }

    /// Sets the protected path prefix.
    pub fn protected_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.protected_prefix = prefix.into();
        self
    }

    /// Sets the login path.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Sets the landing path for already-authenticated visitors of the login path.
    pub fn landing_path(mut self, path: impl Into<String>) -> Self {
        self.landing_path = path.into();
        self
    }

    /// Sets the marker query key and the value that triggers normalization.
    pub fn marker(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.marker_key = key.into();
        self.marker_value = value.into();
        self
    }

    /// Replaces the exclusion list.
    pub fn exclusions(mut self, exclusions: ExclusionMatcher) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Sets the redirect status used for every redirect.
    pub fn redirect_status(mut self, status: RedirectStatus) -> Self {
        self.redirect_status = status.code();
        self
    }

    /// Applies overrides from a variable lookup.
    ///
    /// Pass `|k| std::env::var(k).ok()` to read the process environment. An
    /// unparseable `EDGE_GATE_REDIRECT_STATUS` is surfaced by `build()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use edge_gate::{GateConfig, RedirectStatus};
    ///
    /// let config = GateConfig::builder()
    ///     .with_env(|key| match key {
    ///         "EDGE_GATE_REDIRECT_STATUS" => Some("302".to_string()),
    ///         _ => None,
    ///     })
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(config.redirect_status(), RedirectStatus::Found);
    /// ```
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_ORIGIN) {
            self.site_origin = v;
        }
        if let Some(v) = lookup(ENV_PROTECTED_PREFIX) {
            self.protected_prefix = v;
        }
        if let Some(v) = lookup(ENV_LOGIN_PATH) {
            self.login_path = v;
        }
        if let Some(v) = lookup(ENV_LANDING_PATH) {
            self.landing_path = v;
        }
        if let Some(v) = lookup(ENV_REDIRECT_STATUS) {
            // 0 is never a redirect code, so build() reports it
            self.redirect_status = v.trim().parse().unwrap_or(0);
        }
        self
    }

    /// Validates and returns the configuration.
    ///
    /// Paths are stored percent-encoded, the form request paths arrive in,
    /// so `/admin/giriş` matches a request for `/admin/giri%C5%9F`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a path lacks a leading `/`, the login and
    /// landing paths coincide, the marker key is empty, the origin is not an
    /// absolute http(s) URL, or the redirect status is not a redirect.
    pub fn build(self) -> Result<GateConfig, ConfigError> {
        for (name, value) in [
            ("protected_prefix", &self.protected_prefix),
            ("login_path", &self.login_path),
            ("landing_path", &self.landing_path),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::new(
                    ConfigErrorKind::MissingLeadingSlash,
                    format!("{} '{}' must start with '/'", name, value),
                ));
            }
        }

        let site_origin = parse_origin(&self.site_origin)?;
        let protected_prefix = encode_path(&site_origin, &self.protected_prefix);
        let login_path = encode_path(&site_origin, &self.login_path);
        let landing_path = encode_path(&site_origin, &self.landing_path);

        if login_path == landing_path {
            return Err(ConfigError::new(
                ConfigErrorKind::LoginEqualsLanding,
                format!("'{}' cannot be both login and landing path", login_path),
            ));
        }

        if self.marker_key.is_empty() {
            return Err(ConfigError::new(
                ConfigErrorKind::EmptyMarker,
                "marker key must not be empty",
            ));
        }

        let redirect_status = RedirectStatus::from_code(self.redirect_status).ok_or_else(|| {
            ConfigError::new(
                ConfigErrorKind::InvalidRedirectStatus,
                format!(
                    "{} is not one of 301, 302, 303, 307, 308",
                    self.redirect_status
                ),
            )
        })?;

        if redirect_status.is_permanent() {
            tracing::warn!(
                status = redirect_status.code(),
                "permanent redirect status configured; clients will cache gate redirects"
            );
        }

        Ok(GateConfig {
            site_origin,
            protected_prefix,
            login_path,
            landing_path,
            marker_key: self.marker_key,
            marker_value: self.marker_value,
            exclusions: self.exclusions,
            redirect_status,
        })
    }
}

impl Default for GateConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `path` as `Url` serializes it: percent-encoded, dot segments resolved.
fn encode_path(origin: &Url, path: &str) -> String {
    let mut url = origin.clone();
    url.set_path(path);
    url.path().to_string()
}

fn parse_origin(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| {
        ConfigError::new(
            ConfigErrorKind::InvalidOrigin,
            format!("'{}' is not a URL: {}", raw, e),
        )
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return Err(ConfigError::new(
            ConfigErrorKind::InvalidOrigin,
            format!("'{}' must be an absolute http(s) origin", raw),
        ));
    }

    Ok(url)
}
