//! Stale tracking-parameter normalization.
//!
//! Requests carrying the marker parameter (`m=1` by default) are redirected to
//! the same URL without it. The candidate target is always derived from the
//! request's own URL and compared against it before redirecting; an identical
//! candidate falls through, so this stage can never redirect a URL to itself.

use url::form_urlencoded;
use url::Url;

use crate::config::GateConfig;
use crate::logging::GateLog;
use crate::request::RequestDescriptor;
use crate::response::{Redirect, RedirectReason};

/// Runs the normalization stage.
///
/// Returns `Some(Redirect)` when the first value of the marker key equals the
/// trigger value and removing every occurrence of the key changes the URL.
/// Returns `None` otherwise, including when the candidate equals the request
/// URL. Runs for every path.
///
/// # Examples
///
/// ```
/// use edge_gate::{normalize_params, GateConfig, RequestDescriptor};
///
/// let config = GateConfig::builder().build().unwrap();
/// let req = RequestDescriptor::parse("https://example.com/blog/my-post?m=1", None).unwrap();
///
/// let redirect = normalize_params(&req, &config).expect("marker present");
/// assert_eq!(redirect.target().as_str(), "https://example.com/blog/my-post");
///
/// let clean = RequestDescriptor::parse("https://example.com/blog/my-post", None).unwrap();
/// assert!(normalize_params(&clean, &config).is_none());
/// ```
pub fn normalize_params(req: &RequestDescriptor, config: &GateConfig) -> Option<Redirect> {
    let log = GateLog::for_request(req);

    if req.query_value(config.marker_key()).as_deref() != Some(config.marker_value()) {
        return None;
    }

    let candidate = strip_query_key(req.url(), config.marker_key());

    if candidate.as_str() == req.url().as_str() {
        log.debug(format_args!(
            "marker candidate equals request url, not redirecting"
        ));
        return None;
    }

    log.info(format_args!(
        "stripping marker '{}', redirecting to {}",
        config.marker_key(),
        candidate
    ));

    Some(Redirect::new(
        candidate,
        config.redirect_status(),
        RedirectReason::StaleMarker,
    ))
}

/// Returns `url` with every query segment whose decoded key is `key` removed.
///
/// Other segments keep their original encoding and order. Empty segments are
/// dropped, and a query left empty is removed together with its `?`.
pub fn strip_query_key(url: &Url, key: &str) -> Url {
    let mut candidate = url.clone();

    let Some(query) = url.query() else {
        return candidate;
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| segment_key(segment).as_deref() != Some(key))
        .collect();

    if kept.is_empty() {
        candidate.set_query(None);
    } else {
        candidate.set_query(Some(&kept.join("&")));
    }

    candidate
}

fn segment_key(segment: &str) -> Option<String> {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(k, _)| k.into_owned())
}
