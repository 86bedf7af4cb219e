//! Walks a handful of storefront requests through the gate.
//!
//! Run with `cargo run --example gate_walkthrough`. `EDGE_GATE_*` variables
//! override the configuration.

use std::time::Duration;

use edge_gate::web::redirect_response;
use edge_gate::{EdgeGate, GateConfig, GateOutcome, MemorySessionProvider};
use http::header::{COOKIE, LOCATION, SET_COOKIE};
use http::Request;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let config = GateConfig::builder()
        .site_origin("https://shop.example.com")
        .with_env(|key| std::env::var(key).ok())
        .build()?;

    let provider = MemorySessionProvider::new("sb-session", Duration::from_secs(3600));
    provider.insert("tok-admin")?;

    let gate = EdgeGate::new(config, provider);

    let requests = [
        ("/blog/my-post?m=1", None),
        ("/admin/products?m=1", None),
        ("/admin/products", None),
        ("/admin/products", Some("sb-session=tok-admin")),
        ("/admin/auth", Some("sb-session=tok-admin")),
        ("/admin/auth", Some("sb-session=tok-expired")),
        ("/api/revalidate", None),
    ];

    for (i, (uri, cookie)) in requests.into_iter().enumerate() {
        let mut builder = Request::builder()
            .uri(uri)
            .header("x-request-id", format!("demo-{}", i));
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let req = builder.body(())?;

        println!("GET {} (cookie: {})", uri, cookie.map_or("none", |_| "sb-session"));
        match gate.handle_http(&req).await {
            GateOutcome::Redirect(redirect) => {
                let response = redirect_response::<()>(&redirect)?;
                println!(
                    "  -> {} {} ({})",
                    response.status().as_u16(),
                    response.headers()[LOCATION].to_str()?,
                    redirect.reason()
                );
                for value in response.headers().get_all(SET_COOKIE) {
                    println!("     set-cookie: {}", value.to_str()?);
                }
            }
            GateOutcome::PassThrough(pass) => {
                println!("  -> handler (session: {:?})", pass.session());
                for op in pass.cookies() {
                    println!("     cookie op on {}", op.name());
                }
            }
        }
    }

    Ok(())
}
