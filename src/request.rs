use url::Url;

use crate::cookies::RequestCookies;
use crate::error::{RequestError, RequestErrorKind};

/// Everything the gate looks at for one incoming request.
///
/// Holds the absolute request URL, the parsed cookie set and an optional
/// request id for log correlation. It is never mutated by the gate.
#[derive(Debug)]
pub struct RequestDescriptor {
    url: Url,
    cookies: RequestCookies,
    request_id: Option<String>,
}

impl RequestDescriptor {
    /// Creates a descriptor from an already parsed URL and cookie set.
    pub fn new(url: Url, cookies: RequestCookies) -> Self {
        Self {
            url,
            cookies,
            request_id: None,
        }
    }

    /// Parses an absolute URL and an optional `Cookie` header value.
    ///
    /// # Errors
    ///
    /// Returns `RequestError` with kind `InvalidUrl` if `url` is not an
    /// absolute URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use edge_gate::RequestDescriptor;
    ///
    /// let req = RequestDescriptor::parse(
    ///     "https://shop.example.com/admin/products?page=2",
    ///     Some("sb-session=abc"),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(req.path(), "/admin/products");
    /// assert_eq!(req.query_value("page"), Some("2".to_string()));
    /// assert!(req.cookies().contains("sb-session"));
    /// ```
    pub fn parse(url: &str, cookie_header: Option<&str>) -> Result<Self, RequestError> {
        let url = Url::parse(url).map_err(|e| {
            RequestError::new(
                RequestErrorKind::InvalidUrl,
                format!("cannot parse request url: {}", e),
            )
        })?;
        let cookies = cookie_header.map(RequestCookies::parse).unwrap_or_default();
        Ok(Self::new(url, cookies))
    }

    /// Attaches a request id used in every log line for this request.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// The absolute request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request path.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// The raw query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    /// First decoded value of the given query key.
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Request cookies.
    pub fn cookies(&self) -> &RequestCookies {
        &self.cookies
    }

    /// The request id, or `"-"` when none was supplied.
    pub fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_absolute_url() {
        let req = RequestDescriptor::parse("https://example.com/blog/post?a=1&b=2", None).unwrap();

        assert_eq!(req.path(), "/blog/post");
        assert_eq!(req.query(), Some("a=1&b=2"));
        assert!(req.cookies().is_empty());
    }

    #[test]
    fn parse_rejects_relative_url() {
        let err = RequestDescriptor::parse("/admin", None).unwrap_err();
        assert_eq!(err.kind, RequestErrorKind::InvalidUrl);
    }

    #[test]
    fn query_value_decodes_and_returns_first() {
        let req =
            RequestDescriptor::parse("https://example.com/?q=3d+print&q=other", None).unwrap();
        assert_eq!(req.query_value("q"), Some("3d print".to_string()));
        assert_eq!(req.query_value("missing"), None);
    }

    #[test]
    fn request_id_defaults_to_dash() {
        let req = RequestDescriptor::parse("https://example.com/", None).unwrap();
        assert_eq!(req.request_id(), "-");

        let req = req.with_request_id("req-42");
        assert_eq!(req.request_id(), "req-42");
    }
}
