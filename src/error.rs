use std::fmt;

/// A rejected gate configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// What was wrong with the configuration
    pub kind: ConfigErrorKind,
    /// Human-readable message naming the offending value
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// The kind of configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// A path setting does not start with `/`
    MissingLeadingSlash,
    /// Login and landing paths are the same, which would bounce forever
    LoginEqualsLanding,
    /// The marker query key is empty
    EmptyMarker,
    /// The site origin is not an absolute http(s) URL
    InvalidOrigin,
    /// The redirect status is not a 3xx redirect code
    InvalidRedirectStatus,
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorKind::MissingLeadingSlash => write!(f, "missing leading slash"),
            ConfigErrorKind::LoginEqualsLanding => write!(f, "login path equals landing path"),
            ConfigErrorKind::EmptyMarker => write!(f, "empty marker key"),
            ConfigErrorKind::InvalidOrigin => write!(f, "invalid site origin"),
            ConfigErrorKind::InvalidRedirectStatus => write!(f, "invalid redirect status"),
        }
    }
}

/// An incoming request that could not be described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    /// What was wrong with the request
    pub kind: RequestErrorKind,
    /// Human-readable message
    pub message: String,
}

impl RequestError {
    /// Creates a new request error.
    pub fn new(kind: RequestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RequestError {}

/// The kind of request error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// The request URL could not be parsed or made absolute
    InvalidUrl,
}

impl fmt::Display for RequestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestErrorKind::InvalidUrl => write!(f, "invalid url"),
        }
    }
}

/// A failure reported by a [`SessionProvider`](crate::SessionProvider).
///
/// The gate never propagates this to the client: it is logged and the
/// session is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    /// The kind of failure
    pub kind: SessionErrorKind,
    /// Human-readable message; must not contain token material
    pub message: String,
}

impl SessionError {
    /// Creates a new session error.
    pub fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an [`SessionErrorKind::Unavailable`] error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::Unavailable, message)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SessionError {}

/// The kind of session provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    /// The backing store could not be reached
    Unavailable,
    /// The session store answered with an error or is in a broken state
    Backend,
}

impl fmt::Display for SessionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionErrorKind::Unavailable => write!(f, "Unavailable"),
            SessionErrorKind::Backend => write!(f, "Backend error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_includes_kind_and_message() {
        let err = ConfigError::new(ConfigErrorKind::MissingLeadingSlash, "login_path 'admin'");
        assert_eq!(err.to_string(), "missing leading slash: login_path 'admin'");
    }

    #[test]
    fn session_error_display_includes_kind() {
        let err = SessionError::unavailable("connection refused");
        assert_eq!(err.kind, SessionErrorKind::Unavailable);
        assert_eq!(err.to_string(), "Unavailable: connection refused");

        let err = SessionError::new(SessionErrorKind::Backend, "lock poisoned");
        assert_eq!(err.to_string(), "Backend error: lock poisoned");
    }

    #[test]
    fn errors_are_std_errors() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}

        assert_error(&RequestError::new(RequestErrorKind::InvalidUrl, "relative"));
        assert_error(&ConfigError::new(ConfigErrorKind::EmptyMarker, "m"));
        assert_error(&SessionError::unavailable("down"));
    }
}
