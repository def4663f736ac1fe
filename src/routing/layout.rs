//! Mount layout: which handler answers which path, and in what order.
//!
//! ```text
//! 1. assets      {ctx, ""}            index only       (hosting active)
//! 2. api         {"", /metrics}       unmounted        (ctx non-root)
//!                {"", /health/*}
//!                {"", /dacha2/*}      if an API prefix
//! 3.             {ctx, /metrics}
//!                {ctx, /health/*}
//! 4.             {ctx, <prefix>}...   every API prefix
//! 5. assets      {ctx, /*}            catch-all        (hosting active)
//! ```
//!
//! Steps 2 to 4 are a single entry bound to the API dispatcher.

use crate::http::handler::HandlerRef;
use crate::routing::chain::HandlerChain;
use crate::routing::matcher::MountRule;

pub const METRICS_PATTERN: &str = "/metrics";
pub const HEALTH_PATTERN: &str = "/health/*";
pub const PEER_PROTOCOL_PATTERN: &str = "/dacha2/*";

pub const ASSET_INDEX_HANDLER: &str = "assets-index";
pub const API_HANDLER: &str = "api";
pub const ASSET_HANDLER: &str = "assets";

/// Build the chain for a service mounted at `context_path`.
///
/// `assets` is `Some` only when web hosting is active; without it nothing is
/// registered as a catch-all.
pub fn build_handler_chain(
    context_path: &str,
    api_prefixes: &[String],
    api: HandlerRef,
    assets: Option<HandlerRef>,
) -> HandlerChain {
    let mut chain = HandlerChain::builder();

    if let Some(assets) = &assets {
        tracing::info!("starting with web asset support - adding default path");
        chain = chain.add_handler(
            ASSET_INDEX_HANDLER,
            assets.clone(),
            vec![MountRule::new(context_path, "")],
        );
    }

    chain = chain.add_handler(API_HANDLER, api, api_rules(context_path, api_prefixes));

    if let Some(assets) = assets {
        tracing::info!("starting with web asset support - adding remaining paths");
        chain = chain.add_handler(ASSET_HANDLER, assets, vec![MountRule::new(context_path, "/*")]);
    }

    chain.build()
}

fn api_rules(context_path: &str, api_prefixes: &[String]) -> Vec<MountRule> {
    let mut rules = Vec::with_capacity(api_prefixes.len() + 5);

    // Mounted under a prefix: probes still reach the bare root.
    if !context_path.is_empty() && context_path != "/" {
        rules.push(MountRule::new("", METRICS_PATTERN));
        rules.push(MountRule::new("", HEALTH_PATTERN));

        if api_prefixes.iter().any(|p| p == PEER_PROTOCOL_PATTERN) {
            rules.push(MountRule::new("", PEER_PROTOCOL_PATTERN));
        }
    }

    rules.push(MountRule::new(context_path, METRICS_PATTERN));
    rules.push(MountRule::new(context_path, HEALTH_PATTERN));

    for prefix in api_prefixes {
        rules.push(MountRule::new(context_path, prefix));
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::handler_fn;
    use crate::routing::registry;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    fn stub() -> HandlerRef {
        Arc::new(handler_fn(|_req: Request<Body>| async { "ok".into_response() }))
    }

    fn handler_for(chain: &HandlerChain, path: &str) -> Option<String> {
        chain.find(path).map(|m| m.entry.name().to_string())
    }

    fn rule_strings(chain: &HandlerChain, entry: usize) -> Vec<String> {
        chain.entries()[entry]
            .rules()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_registration_order_with_hosting() {
        let prefixes = registry::default_prefixes();
        let chain = build_handler_chain("/app", &prefixes, stub(), Some(stub()));

        let names: Vec<_> = chain.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec![ASSET_INDEX_HANDLER, API_HANDLER, ASSET_HANDLER]);

        assert_eq!(
            rule_strings(&chain, 1)[..5],
            ["/metrics", "/health/*", "/dacha2/*", "/app/metrics", "/app/health/*"]
        );
        assert_eq!(rule_strings(&chain, 1).len(), 5 + prefixes.len());
        assert_eq!(rule_strings(&chain, 2), vec!["/app/*"]);
    }

    #[test]
    fn test_operational_beats_catch_all() {
        let chain = build_handler_chain("", &registry::default_prefixes(), stub(), Some(stub()));

        assert_eq!(handler_for(&chain, "/metrics").as_deref(), Some(API_HANDLER));
        assert_eq!(handler_for(&chain, "/health/liveness").as_deref(), Some(API_HANDLER));
        assert_eq!(handler_for(&chain, "/mr-api/portfolios").as_deref(), Some(API_HANDLER));
        assert_eq!(handler_for(&chain, "/").as_deref(), Some(ASSET_INDEX_HANDLER));
        assert_eq!(handler_for(&chain, "/main.js").as_deref(), Some(ASSET_HANDLER));
    }

    #[test]
    fn test_mounted_and_unmounted_probes() {
        let chain = build_handler_chain("/app", &registry::default_prefixes(), stub(), None);

        for path in ["/metrics", "/app/metrics", "/health/readiness", "/app/health/readiness"] {
            assert_eq!(handler_for(&chain, path).as_deref(), Some(API_HANDLER), "{}", path);
        }

        // API routes only exist under the mount
        assert_eq!(handler_for(&chain, "/app/mr-api/x").as_deref(), Some(API_HANDLER));
        assert_eq!(handler_for(&chain, "/mr-api/x"), None);
    }

    #[test]
    fn test_root_mount_registers_no_duplicates() {
        let prefixes = registry::default_prefixes();
        let chain = build_handler_chain("", &prefixes, stub(), None);
        assert_eq!(chain.entries().len(), 1);
        assert_eq!(rule_strings(&chain, 0).len(), 2 + prefixes.len());
    }

    #[test]
    fn test_no_hosting_means_no_catch_all() {
        let chain = build_handler_chain("/app", &registry::default_prefixes(), stub(), None);
        assert_eq!(chain.entries().len(), 1);
        assert_eq!(handler_for(&chain, "/app/"), None);
        assert_eq!(handler_for(&chain, "/app/index.html"), None);
    }

    #[test]
    fn test_peer_protocol_root_exposure() {
        let with_peer = build_handler_chain("/app", &registry::default_prefixes(), stub(), None);
        assert_eq!(handler_for(&with_peer, "/dacha2/anything").as_deref(), Some(API_HANDLER));

        let without_peer = build_handler_chain(
            "/app",
            &registry::parse_prefixes("/mr-api/*"),
            stub(),
            None,
        );
        assert_eq!(handler_for(&without_peer, "/dacha2/anything"), None);
        assert_eq!(handler_for(&without_peer, "/app/dacha2/anything"), None);
    }

    #[test]
    fn test_empty_prefixes_keep_operational_routes() {
        let chain = build_handler_chain("/app", &[], stub(), Some(stub()));
        assert_eq!(handler_for(&chain, "/app/metrics").as_deref(), Some(API_HANDLER));
        assert_eq!(handler_for(&chain, "/app/mr-api/x").as_deref(), Some(ASSET_HANDLER));
    }
}
