use std::fmt;

/// A cookie or token value that must never reach logs.
///
/// Session cookies carry bearer material. Every place the gate holds one
/// (request cookies, cookie operations returned by a session provider) wraps
/// it in `Secret` so that `Debug` and `Display` print `[REDACTED]`.
///
/// # Examples
///
/// ```
/// use edge_gate::Secret;
///
/// let token = Secret::new("eyJhbGciOi...".to_string());
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(token.expose_secret(), "eyJhbGciOi...");
/// ```
// Do NOT derive Clone or Debug: values must be moved, and formatting must redact.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Returns the wrapped value.
    ///
    /// Only session providers and the `Set-Cookie` renderer should call this.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
