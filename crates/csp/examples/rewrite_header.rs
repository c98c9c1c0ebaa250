//! Rewrites a Content-Security-Policy header the way a proxy would before
//! forwarding a response.
//!
//! Run with `RUST_LOG=trace cargo run --example rewrite_header -- "<header>"`.

use citadel_csp::{CspResult, Policy};
use url::Url;

fn main() -> CspResult<()> {
    env_logger::init();

    let header = std::env::args().nth(1).unwrap_or_else(|| {
        "default-src 'self'; img-src 'self' data:; script-src 'self' 'unsafe-inline';".to_string()
    });

    let mut policy = Policy::parse(&header);
    println!("original:  {}", policy);

    policy.remove_source("script-src", "'unsafe-inline'")?;
    if let Ok(cdn) = Url::parse("https://cdn.example.com/assets/app.js") {
        policy.add_origin("script-src", &cdn)?;
    }
    policy.set("object-src", "'none'")?;
    policy.set_flag("upgrade-insecure-requests")?;

    println!("rewritten: {}", policy);
    Ok(())
}
