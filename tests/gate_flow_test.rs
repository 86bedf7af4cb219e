//! End-to-end flows through both gate stages.

mod common;

use common::{gate, request, DownSession, StaticSession};
use edge_gate::{GateOutcome, RedirectReason, RedirectStatus, SessionState};

#[tokio::test]
async fn marker_on_admin_path_is_stripped_before_any_session_check() {
    let gate = gate(StaticSession::signed_out());

    let outcome = gate.handle(&request("/admin/products?m=1")).await;

    let redirect = outcome.as_redirect().expect("marker redirect");
    assert_eq!(redirect.reason(), RedirectReason::StaleMarker);
    assert_eq!(
        redirect.target().as_str(),
        "https://shop.example.com/admin/products"
    );
    assert_eq!(gate.provider().calls(), 0);
}

#[tokio::test]
async fn following_the_marker_redirect_then_hits_login() {
    let gate = gate(StaticSession::signed_out());

    let first = gate.handle(&request("/admin/products?m=1")).await;
    let target = first.as_redirect().expect("marker redirect").target().clone();

    let second = gate
        .handle(&edge_gate::RequestDescriptor::parse(target.as_str(), None).unwrap())
        .await;
    let redirect = second.as_redirect().expect("login redirect");
    assert_eq!(redirect.reason(), RedirectReason::LoginRequired);
    assert_eq!(redirect.target().path(), "/admin/auth");
}

#[tokio::test]
async fn admin_without_session_goes_to_login() {
    let gate = gate(StaticSession::signed_out());

    let outcome = gate.handle(&request("/admin/products")).await;

    let redirect = outcome.as_redirect().expect("login redirect");
    assert_eq!(
        redirect.target().as_str(),
        "https://shop.example.com/admin/auth"
    );
    assert_eq!(redirect.status(), RedirectStatus::TemporaryRedirect);
}

#[tokio::test]
async fn login_with_session_goes_to_landing() {
    let gate = gate(StaticSession::signed_in());

    let outcome = gate.handle(&request("/admin/auth")).await;

    let redirect = outcome.as_redirect().expect("landing redirect");
    assert_eq!(redirect.reason(), RedirectReason::AlreadyAuthenticated);
    assert_eq!(redirect.target().as_str(), "https://shop.example.com/admin");
}

#[tokio::test]
async fn blog_marker_is_stripped_and_blog_is_public() {
    let gate = gate(StaticSession::signed_out());

    let outcome = gate.handle(&request("/blog/my-post?m=1")).await;
    assert_eq!(
        outcome.as_redirect().expect("marker redirect").target().as_str(),
        "https://shop.example.com/blog/my-post"
    );

    let outcome = gate.handle(&request("/blog/my-post")).await;
    assert!(outcome.is_pass_through());
}

#[tokio::test]
async fn login_redirect_drops_original_query() {
    let gate = gate(StaticSession::signed_out());

    let outcome = gate.handle(&request("/admin/orders?page=3")).await;

    assert_eq!(
        outcome.as_redirect().unwrap().target().as_str(),
        "https://shop.example.com/admin/auth"
    );
}

#[tokio::test]
async fn login_page_with_query_and_no_session_is_served() {
    let gate = gate(StaticSession::signed_out());
    let outcome = gate.handle(&request("/admin/auth?next=%2Fadmin%2Forders")).await;
    assert!(outcome.is_pass_through());
}

#[tokio::test]
async fn prefix_match_is_literal() {
    let gate = gate(StaticSession::signed_out());

    let outcome = gate.handle(&request("/administrator")).await;

    assert_eq!(
        outcome.as_redirect().expect("literal prefix").reason(),
        RedirectReason::LoginRequired
    );
}

#[tokio::test]
async fn excluded_paths_are_not_gated() {
    let gate = gate(StaticSession::signed_out());

    for path in ["/api/revalidate?m=1", "/_next/static/chunk.js", "/favicon.ico"] {
        match gate.handle(&request(path)).await {
            GateOutcome::PassThrough(p) => assert_eq!(p.session(), SessionState::Skipped),
            GateOutcome::Redirect(r) => panic!("{} redirected to {}", path, r.target()),
        }
    }
    assert_eq!(gate.provider().calls(), 0);
}

#[tokio::test]
async fn backend_outage_locks_admin_but_serves_public_pages() {
    let gate = gate(DownSession);

    let admin = gate.handle(&request("/admin")).await;
    assert_eq!(
        admin.as_redirect().expect("fail closed").reason(),
        RedirectReason::LoginRequired
    );

    let login = gate.handle(&request("/admin/auth")).await;
    assert!(login.is_pass_through());

    match gate.handle(&request("/products/benchy")).await {
        GateOutcome::PassThrough(p) => {
            assert_eq!(p.session(), SessionState::Unavailable);
            assert!(p.cookies().is_empty());
        }
        GateOutcome::Redirect(_) => panic!("public page must be served"),
    }
}

#[tokio::test]
async fn refreshed_cookie_travels_on_every_outcome() {
    let gate = gate(StaticSession::refreshing("sb-session"));

    let pass = gate.handle(&request("/admin/products")).await;
    assert!(pass.is_pass_through());
    assert_eq!(pass.cookies()[0].name(), "sb-session");

    let bounce = gate.handle(&request("/admin/auth")).await;
    assert!(bounce.as_redirect().is_some());
    assert_eq!(bounce.cookies()[0].name(), "sb-session");

    let public = gate.handle(&request("/blog")).await;
    assert_eq!(public.cookies().len(), 1);
}

#[tokio::test]
async fn provider_is_consulted_once_per_gated_request() {
    let gate = gate(StaticSession::signed_in());

    gate.handle(&request("/")).await;
    gate.handle(&request("/admin")).await;
    gate.handle(&request("/blog?m=1")).await;

    assert_eq!(gate.provider().calls(), 2);
}

#[tokio::test]
async fn non_ascii_login_path_bounces_signed_in_visitor() {
    let config = edge_gate::GateConfig::builder()
        .site_origin(common::ORIGIN)
        .login_path("/admin/giriş")
        .build()
        .unwrap();
    let gate = edge_gate::EdgeGate::new(config, StaticSession::signed_in());

    let outcome = gate.handle(&request("/admin/giri%C5%9F")).await;

    let redirect = outcome.as_redirect().expect("landing redirect");
    assert_eq!(redirect.reason(), RedirectReason::AlreadyAuthenticated);
    assert_eq!(redirect.target().as_str(), "https://shop.example.com/admin");
}

#[tokio::test]
async fn non_ascii_login_path_is_the_login_target() {
    let config = edge_gate::GateConfig::builder()
        .site_origin(common::ORIGIN)
        .login_path("/admin/giriş")
        .build()
        .unwrap();
    let gate = edge_gate::EdgeGate::new(config, StaticSession::signed_out());

    let outcome = gate.handle(&request("/admin/orders")).await;
    assert_eq!(
        outcome.as_redirect().unwrap().target().path(),
        "/admin/giri%C5%9F"
    );

    let login = gate.handle(&request("/admin/giri%C5%9F")).await;
    assert!(login.is_pass_through());
}
