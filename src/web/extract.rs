//! Building gate descriptors from framework request types.

use http::header::{HeaderName, COOKIE};
use url::Url;

use crate::cookies::RequestCookies;
use crate::request::RequestDescriptor;

/// Header read as the request id, when present.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Maps a framework request onto a [`RequestDescriptor`].
///
/// Implementations must not fail: whatever cannot be read is left out
/// (an unreadable cookie header contributes no cookies), so the access check
/// still runs and fails closed.
pub trait DescribeRequest {
    /// Builds the descriptor, resolving the path against `origin`.
    fn describe(&self, origin: &Url) -> RequestDescriptor;
}

impl<B> DescribeRequest for http::Request<B> {
    /// Uses the configured origin rather than the `Host` header, so a
    /// redirect target can never point at a host the client chose.
    fn describe(&self, origin: &Url) -> RequestDescriptor {
        let mut url = origin.clone();
        url.set_path(self.uri().path());
        url.set_query(self.uri().query());
        url.set_fragment(None);

        let mut cookies = RequestCookies::new();
        for value in self.headers().get_all(COOKIE) {
            match value.to_str() {
                Ok(header) => cookies.extend_from_header(header),
                Err(_) => tracing::debug!("skipping non-utf8 cookie header"),
            }
        }

        let descriptor = RequestDescriptor::new(url, cookies);
        match self
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some(id) => descriptor.with_request_id(id),
            None => descriptor,
        }
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, Request};

    use super::*;

    fn origin() -> Url {
        Url::parse("https://shop.example.com").unwrap()
    }

    #[test]
    fn describes_path_query_and_cookies() {
        let req = Request::builder()
            .uri("/admin/products?page=2&m=1")
            .header(COOKIE, "sid=abc; theme=dark")
            .header("x-request-id", "req-9")
            .body(())
            .unwrap();

        let d = req.describe(&origin());

        assert_eq!(
            d.url().as_str(),
            "https://shop.example.com/admin/products?page=2&m=1"
        );
        assert_eq!(d.cookies().len(), 2);
        assert_eq!(d.request_id(), "req-9");
    }

    #[test]
    fn merges_multiple_cookie_headers() {
        let req = Request::builder()
            .uri("/")
            .header(COOKIE, "a=1")
            .header(COOKIE, "b=2")
            .body(())
            .unwrap();

        let d = req.describe(&origin());
        assert!(d.cookies().contains("a"));
        assert!(d.cookies().contains("b"));
    }

    #[test]
    fn ignores_host_of_absolute_form_uri() {
        let req = Request::builder()
            .uri("http://evil.example/admin?m=1")
            .body(())
            .unwrap();

        let d = req.describe(&origin());
        assert_eq!(d.url().host_str(), Some("shop.example.com"));
        assert_eq!(d.path(), "/admin");
    }

    #[test]
    fn non_utf8_cookie_header_is_skipped() {
        let mut req = Request::builder().uri("/admin").body(()).unwrap();
        req.headers_mut()
            .append(COOKIE, HeaderValue::from_bytes(b"sid=\xff").unwrap());
        req.headers_mut()
            .append(COOKIE, HeaderValue::from_static("ok=1"));

        let d = req.describe(&origin());
        assert!(!d.cookies().contains("sid"));
        assert!(d.cookies().contains("ok"));
    }
}
